use crate::core::{Preset, ProviderError};

use super::api::{Input, Job, Location};
use super::mapper::build_output_group;

pub const DEFAULT_JOB_PRIORITY: u32 = 50;

/// Storage credentials handed to the backend for both input and output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Credentials {
    fn location(&self, uri: String) -> Location {
        Location {
            uri,
            username: self.access_key_id.clone(),
            password: self.secret_access_key.clone(),
        }
    }
}

/// Output path for `source`: its file name without extension, under
/// `destination_root`.
///
/// `s3://bucket/path/video.mov` under `s3://out/` becomes `s3://out/video`.
pub fn build_destination(source: &str, destination_root: &str) -> String {
    let file_name = source.rsplit('/').next().unwrap_or(source);
    let base_name = match file_name.rfind('.') {
        Some(dot) => &file_name[..dot],
        None => file_name,
    };
    format!("{}/{}", destination_root.trim_end_matches('/'), base_name)
}

/// Assemble a complete job submission for `source` and `presets`.
pub fn build_job(
    source: &str,
    presets: &[Preset],
    credentials: &Credentials,
    destination_root: &str,
) -> Result<Job, ProviderError> {
    let input = credentials.location(source.to_string());
    let destination = credentials.location(build_destination(source, destination_root));

    let (output_group, stream_assembly) = build_output_group(destination, presets)?;

    Ok(Job {
        input: Input { file_input: input },
        priority: DEFAULT_JOB_PRIORITY,
        output_group,
        stream_assembly,
    })
}
