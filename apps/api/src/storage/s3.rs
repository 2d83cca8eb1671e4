use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::Client as S3Client;
use tracing::debug;

use super::{object_key, Blob, BlobStore, StorageError};

/// Blob store backed by an S3 bucket (MinIO locally, AWS in production).
#[derive(Clone)]
pub struct S3BlobStore {
    client: S3Client,
    bucket: String,
}

/// Connection settings for [`S3BlobStore::connect`].
pub struct S3Settings<'a> {
    pub bucket: &'a str,
    pub endpoint: &'a str,
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
}

impl S3BlobStore {
    pub async fn connect(settings: S3Settings<'_>) -> Self {
        let credentials = Credentials::new(
            settings.access_key_id,
            settings.secret_access_key,
            None,
            None,
            "review-static",
        );

        let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .endpoint_url(settings.endpoint)
            .load()
            .await;

        Self {
            client: S3Client::new(&s3_config),
            bucket: settings.bucket.to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn read(&self, path: &str) -> Result<Option<Blob>, StorageError> {
        let key = object_key(path)?;

        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    debug!("s3://{}/{} does not exist", self.bucket, key);
                    return Ok(None);
                }
                return Err(StorageError::Blob(format!("S3 get_object failed: {e}")));
            }
        };

        let content_type = output.content_type().map(str::to_string);
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Blob(format!("S3 body read failed: {e}")))?
            .into_bytes();

        Ok(Some(Blob {
            bytes,
            content_type,
        }))
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::Blob(format!("S3 head_bucket failed: {e}")))?;
        Ok(())
    }
}
