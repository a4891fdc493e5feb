//! Convert command handler.

use std::path::PathBuf;

use dlpro_core::{ConversionProfile, ConvertRequest};
use tracing::info;

use super::watch::watch_job;
use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Arguments for the convert command.
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub profile: Option<String>,
    pub extra_args: Vec<String>,
}

impl ConvertArgs {
    /// Translate CLI input into an engine request.
    ///
    /// Without an explicit profile, one is suggested from the output
    /// extension.
    pub fn into_request(self) -> Result<ConvertRequest, CliError> {
        let profile = match self.profile.as_deref() {
            Some(name) => name.parse::<ConversionProfile>().map_err(CliError::Arguments)?,
            None => ConversionProfile::for_output(&self.output),
        };
        Ok(ConvertRequest::new(self.input, self.output, profile).with_extra_args(self.extra_args))
    }
}

/// Execute the convert command and follow the job to completion.
pub async fn execute(ctx: &mut CliContext, args: ConvertArgs, verbose: bool) -> Result<(), CliError> {
    let request = args.into_request()?;
    info!(profile = %request.profile, "conversion profile");

    let id = ctx.orchestrator.submit_convert(request).await?;
    watch_job(ctx, id, verbose).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(output: &str, profile: Option<&str>) -> ConvertArgs {
        ConvertArgs {
            input: PathBuf::from("in.mkv"),
            output: PathBuf::from(output),
            profile: profile.map(str::to_string),
            extra_args: vec!["-crf".to_string(), "23".to_string()],
        }
    }

    #[test]
    fn test_profile_from_extension() {
        let request = args("out.mp3", None).into_request().unwrap();
        assert_eq!(request.profile, ConversionProfile::Mp3);
        assert_eq!(request.extra_args, vec!["-crf", "23"]);
    }

    #[test]
    fn test_explicit_profile_wins() {
        let request = args("out.mp4", Some("h264-aac")).into_request().unwrap();
        assert_eq!(request.profile, ConversionProfile::H264Aac);
    }

    #[test]
    fn test_unknown_profile() {
        let err = args("out.mp4", Some("turbo")).into_request().unwrap_err();
        assert!(matches!(err, CliError::Arguments(_)));
    }
}
