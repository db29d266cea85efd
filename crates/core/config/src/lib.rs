use cached::proc_macro::cached;
use config::{Config, Environment, File, FileFormat};
use futures_locks::RwLock;
use once_cell::sync::Lazy;
use serde::Deserialize;

static CONFIG_BUILDER: Lazy<RwLock<Config>> = Lazy::new(|| {
    RwLock::new({
        let mut builder = Config::builder().add_source(File::from_str(
            include_str!("../Amani.toml"),
            FileFormat::Toml,
        ));

        if std::path::Path::new("Amani.toml").exists() {
            builder = builder.add_source(File::new("Amani.toml", FileFormat::Toml));
        }

        builder
            .add_source(Environment::with_prefix("AMANI").separator("__"))
            .build()
            .unwrap()
    })
});

#[derive(Deserialize, Debug, Clone)]
pub struct Database {
    pub mongodb: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiSecurity {
    pub admin_token: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Api {
    pub host: String,
    pub port: u16,
    pub security: ApiSecurity,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FilesLimits {
    pub max_count: usize,
    pub max_file_size: usize,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Files {
    pub upload_dir: String,
    pub serve_prefix: String,
    pub limits: FilesLimits,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub database: Database,
    pub api: Api,
    pub files: Files,
}

pub async fn read() -> Config {
    CONFIG_BUILDER.read().await.clone()
}

#[cached(time = 30)]
pub async fn config() -> Settings {
    read().await.try_deserialize::<Settings>().unwrap()
}

#[cfg(test)]
mod tests {
    use crate::config;

    #[tokio::test]
    async fn it_loads_default_settings() {
        let settings = config().await;
        assert_eq!(settings.api.port, 5000);
        assert_eq!(settings.files.limits.max_count, 4);
        assert_eq!(settings.files.limits.max_file_size, 10 * 1024 * 1024);
        assert!(settings.files.serve_prefix.starts_with('/'));
    }
}
