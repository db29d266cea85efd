use std::io::Read;
use std::path::Path;

use axum_typed_multipart::FieldData;
use tempfile::NamedTempFile;
use ulid::Ulid;

use amani_config::config;
use amani_database::iso8601_timestamp::Timestamp;
use amani_result::{create_error, report_internal_error, Result};

/// Extensions accepted for image attachments; nothing beyond the extension
/// is inspected.
static IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Keep `[A-Za-z0-9._-]`, replace everything else
pub fn sanitise_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches(['_', '.']).is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}

fn has_image_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Write one uploaded image part to the upload directory and return the
/// relative path it will be served under.
pub async fn store_attachment(mut file: FieldData<NamedTempFile>) -> Result<String> {
    let config = config().await;

    // Extract the filename, or give it a generic name
    let filename = file
        .metadata
        .file_name
        .clone()
        .unwrap_or_else(|| "unnamed-file".to_string());

    if !has_image_extension(&filename) {
        return Err(create_error!(FileTypeNotAllowed));
    }

    // Load file to memory
    let mut buf = Vec::<u8>::new();
    report_internal_error!(file.contents.read_to_end(&mut buf))?;

    if buf.len() > config.files.limits.max_file_size {
        return Err(create_error!(FileTooLarge {
            max: config.files.limits.max_file_size
        }));
    }

    // Upload timestamp plus an id fragment keeps generated names
    // collision-resistant while staying recognisable.
    let millis = Timestamp::now_utc()
        .duration_since(Timestamp::UNIX_EPOCH)
        .whole_milliseconds();
    let id = Ulid::new().to_string();
    let generated = format!(
        "{millis}-{}-{}",
        &id[id.len() - 6..],
        sanitise_filename(&filename)
    );

    report_internal_error!(tokio::fs::create_dir_all(&config.files.upload_dir).await)?;
    report_internal_error!(
        tokio::fs::write(Path::new(&config.files.upload_dir).join(&generated), &buf).await
    )?;

    Ok(format!(
        "{}/{generated}",
        config.files.serve_prefix.trim_end_matches('/')
    ))
}

#[cfg(test)]
mod test {
    use super::{has_image_extension, sanitise_filename};

    #[test]
    fn sanitises_hostile_filenames() {
        assert_eq!(sanitise_filename("photo.png"), "photo.png");
        assert_eq!(
            sanitise_filename("../../etc/passwd bénin.png"),
            ".._.._etc_passwd_b_nin.png"
        );
        assert_eq!(sanitise_filename("../.."), "unnamed");
        assert_eq!(sanitise_filename(""), "unnamed");
    }

    #[test]
    fn only_image_extensions_are_accepted() {
        assert!(has_image_extension("evidence.JPG"));
        assert!(has_image_extension("photo.webp"));
        assert!(!has_image_extension("report.pdf"));
        assert!(!has_image_extension("no-extension"));
    }
}
