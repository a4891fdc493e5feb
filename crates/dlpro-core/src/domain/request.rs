//! Job submission requests.
//!
//! Requests are immutable once submitted. Validation happens here so both the
//! orchestrator and hosts can reject malformed input before any process is
//! started.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::RequestError;

/// What a download job should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Video,
    Audio,
}

impl MediaKind {
    /// Output container/codec used when the request does not name one.
    #[must_use]
    pub const fn default_format(self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Audio => "mp3",
        }
    }

    /// Formats offered to users for this kind. Other values are passed through.
    #[must_use]
    pub const fn known_formats(self) -> &'static [&'static str] {
        match self {
            Self::Video => &["mp4", "mkv", "webm"],
            Self::Audio => &["mp3", "aac", "m4a", "opus", "wav"],
        }
    }

    /// Whether `format` is one of [`Self::known_formats`], ignoring case.
    #[must_use]
    pub fn is_known_format(self, format: &str) -> bool {
        self.known_formats()
            .iter()
            .any(|known| known.eq_ignore_ascii_case(format.trim()))
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            other => Err(RequestError::unsupported_kind(other)),
        }
    }
}

/// Credential source as submitted by a host.
///
/// `mode` is free text: `none`, `browser` or `file`. Anything else, or a mode
/// missing its companion value, resolves to no cookies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieSpec {
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl CookieSpec {
    pub fn browser(name: impl Into<String>) -> Self {
        Self {
            mode: "browser".to_string(),
            browser: Some(name.into()),
            file_path: None,
        }
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self {
            mode: "file".to_string(),
            browser: None,
            file_path: Some(path.into()),
        }
    }

    /// Resolve the free-text mode into a typed source.
    pub fn source(&self) -> Option<CookieSource> {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        match self.mode.trim().to_ascii_lowercase().as_str() {
            "browser" => non_empty(&self.browser).map(CookieSource::Browser),
            "file" => non_empty(&self.file_path).map(|p| CookieSource::File(PathBuf::from(p))),
            _ => None,
        }
    }
}

/// Typed cookie source handed to the argument builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieSource {
    /// Read cookies from an installed browser profile.
    Browser(String),
    /// Read cookies from a Netscape-format cookie file.
    File(PathBuf),
}

/// A request to download media from a URL.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    pub url: String,
    #[serde(default)]
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<CookieSpec>,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, kind: MediaKind, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            kind,
            format: None,
            out_dir: Some(out_dir.into()),
            cookies: None,
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    #[must_use]
    pub fn with_cookies(mut self, cookies: CookieSpec) -> Self {
        self.cookies = Some(cookies);
        self
    }

    /// The requested format, falling back to the kind's default.
    pub fn effective_format(&self) -> &str {
        self.format
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| self.kind.default_format())
    }

    pub fn cookie_source(&self) -> Option<CookieSource> {
        self.cookies.as_ref().and_then(CookieSpec::source)
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        if self.url.trim().is_empty() {
            return Err(RequestError::MissingUrl);
        }
        match &self.out_dir {
            Some(dir) if !dir.as_os_str().is_empty() => Ok(()),
            _ => Err(RequestError::MissingOutputDir),
        }
    }
}

/// Converter argument preset, always chosen explicitly by the caller.
///
/// A request without a profile is [`Self::Custom`]: only the caller's extra
/// arguments reach the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionProfile {
    /// Copy streams into a new container.
    Remux,
    /// Full re-encode to H.264 video and AAC audio.
    H264Aac,
    /// Drop video, encode audio as MP3.
    Mp3,
    /// Drop video, encode audio as 16-bit PCM.
    Wav,
    /// Grab a single video frame.
    Frame,
    /// No preset arguments; the caller supplies everything.
    #[default]
    Custom,
}

impl ConversionProfile {
    pub const ALL: [Self; 6] = [
        Self::Remux,
        Self::H264Aac,
        Self::Mp3,
        Self::Wav,
        Self::Frame,
        Self::Custom,
    ];

    #[must_use]
    pub const fn args(self) -> &'static [&'static str] {
        match self {
            Self::Remux => &["-codec", "copy"],
            Self::H264Aac => &["-c:v", "libx264", "-c:a", "aac"],
            Self::Mp3 => &["-vn", "-codec:a", "libmp3lame"],
            Self::Wav => &["-vn", "-codec:a", "pcm_s16le"],
            Self::Frame => &["-an", "-vframes", "1"],
            Self::Custom => &[],
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remux => "remux",
            Self::H264Aac => "h264-aac",
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Frame => "frame",
            Self::Custom => "custom",
        }
    }

    /// Suggest a profile for an output file extension.
    ///
    /// Hosts may use this to pre-select a profile; the engine never guesses.
    pub fn for_extension(extension: &str) -> Self {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "mp3" => Self::Mp3,
            "wav" => Self::Wav,
            "mp4" | "mkv" | "mov" | "webm" => Self::Remux,
            "png" | "jpg" | "jpeg" => Self::Frame,
            _ => Self::Custom,
        }
    }

    /// Suggest a profile for an output path, see [`Self::for_extension`].
    pub fn for_output(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(Self::Custom, Self::for_extension)
    }
}

impl fmt::Display for ConversionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversionProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|profile| profile.as_str() == wanted)
            .ok_or_else(|| format!("unknown conversion profile '{s}'"))
    }
}

/// A request to convert one media file into another.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    #[serde(default)]
    pub profile: ConversionProfile,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl ConvertRequest {
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        profile: ConversionProfile,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            profile,
            extra_args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// The input must be an existing file and the output path non-empty.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.input_path.as_os_str().is_empty() || !self.input_path.is_file() {
            return Err(RequestError::missing_input(&self.input_path));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(RequestError::MissingOutput);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_parse() {
        assert_eq!("Video".parse::<MediaKind>().unwrap(), MediaKind::Video);
        assert_eq!("audio".parse::<MediaKind>().unwrap(), MediaKind::Audio);
        assert!(matches!(
            "podcast".parse::<MediaKind>(),
            Err(RequestError::UnsupportedKind { .. })
        ));
    }

    #[test]
    fn test_cookie_modes() {
        assert_eq!(
            CookieSpec::browser("firefox").source(),
            Some(CookieSource::Browser("firefox".to_string()))
        );
        assert_eq!(
            CookieSpec::file("/tmp/c.txt").source(),
            Some(CookieSource::File(PathBuf::from("/tmp/c.txt")))
        );

        let none = CookieSpec {
            mode: "none".to_string(),
            ..CookieSpec::default()
        };
        assert_eq!(none.source(), None);

        let unknown = CookieSpec {
            mode: "keychain".to_string(),
            browser: Some("safari".to_string()),
            file_path: None,
        };
        assert_eq!(unknown.source(), None);

        let browser_without_name = CookieSpec {
            mode: "browser".to_string(),
            browser: Some("  ".to_string()),
            file_path: None,
        };
        assert_eq!(browser_without_name.source(), None);
    }

    #[test]
    fn test_download_request_validation() {
        let ok = DownloadRequest::new("https://example.com/v", MediaKind::Video, "/tmp");
        assert!(ok.validate().is_ok());

        let no_url = DownloadRequest::new("  ", MediaKind::Video, "/tmp");
        assert!(matches!(no_url.validate(), Err(RequestError::MissingUrl)));

        let no_dir = DownloadRequest {
            url: "https://example.com/v".to_string(),
            ..DownloadRequest::default()
        };
        assert!(matches!(no_dir.validate(), Err(RequestError::MissingOutputDir)));
    }

    #[test]
    fn test_effective_format_defaults_per_kind() {
        let video = DownloadRequest::new("u", MediaKind::Video, "/tmp");
        assert_eq!(video.effective_format(), "mp4");

        let audio = DownloadRequest::new("u", MediaKind::Audio, "/tmp");
        assert_eq!(audio.effective_format(), "mp3");

        let explicit = audio.with_format("opus");
        assert_eq!(explicit.effective_format(), "opus");
    }

    #[test]
    fn test_download_request_deserializes_host_payload() {
        let json = r#"{
            "url": "https://example.com/v",
            "kind": "audio",
            "outDir": "/music",
            "cookies": { "mode": "file", "filePath": "/c.txt" }
        }"#;
        let request: DownloadRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.kind, MediaKind::Audio);
        assert_eq!(request.out_dir, Some(PathBuf::from("/music")));
        assert_eq!(
            request.cookie_source(),
            Some(CookieSource::File(PathBuf::from("/c.txt")))
        );
    }

    #[test]
    fn test_profile_args_and_parse() {
        assert_eq!(ConversionProfile::Remux.args(), &["-codec", "copy"]);
        assert!(ConversionProfile::Custom.args().is_empty());
        assert_eq!(
            "h264-aac".parse::<ConversionProfile>().unwrap(),
            ConversionProfile::H264Aac
        );
        assert!("h265".parse::<ConversionProfile>().is_err());
    }

    #[test]
    fn test_known_formats_per_kind() {
        assert!(MediaKind::Video.is_known_format("MKV"));
        assert!(!MediaKind::Video.is_known_format("mp3"));
        assert!(MediaKind::Audio.is_known_format(" opus "));
        assert!(!MediaKind::Audio.is_known_format("flac"));
    }

    #[test]
    fn test_convert_request_without_profile_adds_no_preset() {
        let json = r#"{"inputPath":"/in.mkv","outputPath":"/out.flac","extraArgs":[]}"#;
        let request: ConvertRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.profile, ConversionProfile::Custom);
        assert!(request.profile.args().is_empty());
    }

    #[test]
    fn test_profile_for_extension() {
        assert_eq!(ConversionProfile::for_extension("MP3"), ConversionProfile::Mp3);
        assert_eq!(ConversionProfile::for_extension(".mkv"), ConversionProfile::Remux);
        assert_eq!(ConversionProfile::for_extension("jpg"), ConversionProfile::Frame);
        assert_eq!(ConversionProfile::for_extension("flac"), ConversionProfile::Custom);
        assert_eq!(
            ConversionProfile::for_output(Path::new("/out/clip.wav")),
            ConversionProfile::Wav
        );
    }

    #[test]
    fn test_convert_request_validation() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mkv");

        let missing = ConvertRequest::new(&input, dir.path().join("out.mp4"), ConversionProfile::Remux);
        assert!(matches!(missing.validate(), Err(RequestError::MissingInput { .. })));

        std::fs::write(&input, b"data").unwrap();
        assert!(missing.validate().is_ok());

        let no_output = ConvertRequest::new(&input, "", ConversionProfile::Remux);
        assert!(matches!(no_output.validate(), Err(RequestError::MissingOutput)));
    }
}
