//! Video URL parsing.
//!
//! Accepts the common YouTube URL shapes and reduces them to a video id plus
//! a canonical watch URL, so the same video always maps to the same recipe.

use url::Url;

use crate::error::VideoUrlError;

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Hosts serving full watch pages.
const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "m.youtube.com"];
const SHORT_HOST: &str = "youtu.be";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    pub video_id: String,
    /// Canonical watch URL for `video_id`.
    pub video_url: String,
    /// Host as it appeared in the submitted URL.
    pub host: String,
}

impl VideoRef {
    pub fn parse(raw: &str) -> Result<Self, VideoUrlError> {
        let parsed = Url::parse(raw.trim()).map_err(|e| VideoUrlError::Invalid(e.to_string()))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(VideoUrlError::Invalid(format!(
                "unsupported scheme: {}",
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| VideoUrlError::Invalid("No host in URL".to_string()))?
            .to_ascii_lowercase();

        let video_id = if host == SHORT_HOST {
            first_path_segment(&parsed)
        } else if YOUTUBE_HOSTS.contains(&host.as_str()) {
            let mut segments = parsed.path_segments().into_iter().flatten();
            match segments.next() {
                Some("watch") => parsed
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned()),
                Some("shorts") | Some("embed") | Some("live") => {
                    segments.next().map(str::to_string)
                }
                _ => None,
            }
        } else {
            return Err(VideoUrlError::UnsupportedHost(host));
        };

        let video_id = video_id
            .filter(|id| is_valid_video_id(id))
            .ok_or(VideoUrlError::MissingVideoId)?;

        Ok(Self {
            video_url: format!("{}{}", WATCH_URL_PREFIX, video_id),
            video_id,
            host,
        })
    }

    /// Reject the submission unless its host is in `allowed`.
    /// An empty list allows every supported host.
    pub fn ensure_host_allowed(&self, allowed: &[String]) -> Result<(), VideoUrlError> {
        if allowed.is_empty() || allowed.iter().any(|h| h.eq_ignore_ascii_case(&self.host)) {
            Ok(())
        } else {
            Err(VideoUrlError::UnsupportedHost(self.host.clone()))
        }
    }
}

fn first_path_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn is_valid_video_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_link() {
        let video = VideoRef::parse("https://youtu.be/video-456").unwrap();
        assert_eq!(video.video_id, "video-456");
        assert_eq!(video.video_url, "https://www.youtube.com/watch?v=video-456");
        assert_eq!(video.host, "youtu.be");
    }

    #[test]
    fn parses_watch_shorts_and_embed_urls() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
            "https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://youtube.com/embed/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
        ] {
            let video = VideoRef::parse(url).unwrap_or_else(|e| panic!("{}: {}", url, e));
            assert_eq!(video.video_id, "dQw4w9WgXcQ", "{}", url);
        }
    }

    #[test]
    fn rejects_other_hosts() {
        assert_eq!(
            VideoRef::parse("https://vimeo.com/12345"),
            Err(VideoUrlError::UnsupportedHost("vimeo.com".to_string()))
        );
    }

    #[test]
    fn rejects_missing_or_malformed_ids() {
        assert_eq!(
            VideoRef::parse("https://www.youtube.com/watch?list=abc"),
            Err(VideoUrlError::MissingVideoId)
        );
        assert_eq!(
            VideoRef::parse("https://youtu.be/"),
            Err(VideoUrlError::MissingVideoId)
        );
        assert_eq!(
            VideoRef::parse("https://youtu.be/bad%20id"),
            Err(VideoUrlError::MissingVideoId)
        );
        assert!(matches!(
            VideoRef::parse("not a url"),
            Err(VideoUrlError::Invalid(_))
        ));
        assert!(matches!(
            VideoRef::parse("ftp://youtu.be/abc"),
            Err(VideoUrlError::Invalid(_))
        ));
    }

    #[test]
    fn host_allowlist() {
        let video = VideoRef::parse("https://youtu.be/abc").unwrap();
        assert!(video.ensure_host_allowed(&[]).is_ok());
        assert!(video.ensure_host_allowed(&["YOUTU.BE".to_string()]).is_ok());
        assert!(video
            .ensure_host_allowed(&["www.youtube.com".to_string()])
            .is_err());
    }
}
