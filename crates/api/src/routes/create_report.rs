use axum::{
    extract::{FromRequest, Request, State},
    http::{header, StatusCode},
    Json,
};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use serde::Deserialize;
use tempfile::NamedTempFile;
use ulid::Ulid;
use utoipa::ToSchema;
use validator::Validate;

use amani_config::config;
use amani_database::{iso8601_timestamp::Timestamp, Database, Report, ReportStatus};
use amani_result::{create_error, Error, Result};

use crate::auth::Reporter;
use crate::uploads;

/// Tags given either as a list or as a single comma-separated string
#[derive(Deserialize, ToSchema)]
#[serde(untagged)]
pub enum DataTags {
    List(Vec<String>),
    CommaSeparated(String),
}

impl DataTags {
    /// Normalise into a trimmed list with empty entries dropped
    fn into_list(self) -> Vec<String> {
        match self {
            DataTags::List(tags) => tags
                .into_iter()
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
            DataTags::CommaSeparated(tags) => tags
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

/// # Report Data
#[derive(Validate, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct DataCreateReport {
    /// Short summary of the incident
    #[validate(length(min = 1, max = 200))]
    title: String,
    /// Full description of the incident
    #[validate(length(min = 1, max = 2000))]
    description: String,
    /// Free-text place name
    #[validate(length(max = 200))]
    location: Option<String>,
    /// Whether the reporter chooses to stay anonymous
    #[serde(default = "default_anonymous")]
    anonymous: bool,
    /// Free-form tags
    tags: Option<DataTags>,
    /// Captured device latitude
    #[validate(range(min = -90.0, max = 90.0))]
    latitude: Option<f64>,
    /// Captured device longitude
    #[validate(range(min = -180.0, max = 180.0))]
    longitude: Option<f64>,
}

fn default_anonymous() -> bool {
    true
}

/// Multipart rendition of the report payload: the same scalar fields as
/// form parts, plus repeated `images` file parts.
#[derive(TryFromMultipart)]
pub struct DataCreateReportMultipart {
    title: String,
    description: String,
    location: Option<String>,
    anonymous: Option<bool>,
    tags: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[form_data(limit = "10MiB")]
    images: Vec<FieldData<NamedTempFile>>,
}

/// One explicit request schema per content type; anything else is a 400.
pub enum CreateReportBody {
    Json(DataCreateReport),
    Multipart(DataCreateReportMultipart),
}

#[async_trait::async_trait]
impl FromRequest<Database> for CreateReportBody {
    type Rejection = Error;

    async fn from_request(req: Request, state: &Database) -> Result<CreateReportBody> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if content_type.starts_with("application/json") {
            let Json(data) = Json::<DataCreateReport>::from_request(req, state)
                .await
                .map_err(|error| {
                    create_error!(FailedValidation {
                        error: error.to_string()
                    })
                })?;
            Ok(CreateReportBody::Json(data))
        } else if content_type.starts_with("multipart/form-data") {
            let TypedMultipart(data) =
                TypedMultipart::<DataCreateReportMultipart>::from_request(req, state)
                    .await
                    .map_err(|error| {
                        create_error!(FailedValidation {
                            error: error.to_string()
                        })
                    })?;
            Ok(CreateReportBody::Multipart(data))
        } else {
            Err(create_error!(InvalidProperty))
        }
    }
}

/// # Create Report
///
/// Submit a new incident report, optionally with image attachments.
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = DataCreateReport,
    responses(
        (status = 201, description = "Created report", body = Report),
        (status = 400, description = "Invalid payload", body = Error)
    )
)]
pub async fn create_report(
    State(db): State<Database>,
    reporter: Reporter,
    body: CreateReportBody,
) -> Result<(StatusCode, Json<Report>)> {
    let config = config().await;

    let (data, files) = match body {
        CreateReportBody::Json(data) => (data, vec![]),
        CreateReportBody::Multipart(DataCreateReportMultipart {
            title,
            description,
            location,
            anonymous,
            tags,
            latitude,
            longitude,
            images,
        }) => (
            DataCreateReport {
                title,
                description,
                location,
                anonymous: anonymous.unwrap_or(true),
                tags: tags.map(DataTags::CommaSeparated),
                latitude,
                longitude,
            },
            images,
        ),
    };

    data.validate().map_err(|error| {
        create_error!(FailedValidation {
            error: error.to_string()
        })
    })?;

    if files.len() > config.files.limits.max_count {
        return Err(create_error!(TooManyAttachments {
            max: config.files.limits.max_count
        }));
    }

    let mut images = Vec::with_capacity(files.len());
    for file in files {
        images.push(uploads::store_attachment(file).await?);
    }

    let report = Report {
        id: Ulid::new().to_string(),
        title: data.title,
        description: data.description,
        location: data.location,
        latitude: data.latitude,
        longitude: data.longitude,
        anonymous: data.anonymous,
        reporter_id: reporter.id,
        tags: data.tags.map(DataTags::into_list).unwrap_or_default(),
        images,
        status: ReportStatus::Open,
        resolved_at: None,
        created_at: Timestamp::now_utc(),
    };

    db.insert_report(&report).await?;

    tracing::info!(
        id = %report.id,
        anonymous = report.anonymous,
        credentials = reporter.has_credentials,
        images = report.images.len(),
        "report created"
    );

    Ok((StatusCode::CREATED, Json(report)))
}
