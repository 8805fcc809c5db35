//! Loading the page to convert.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use encoding_rs::{Encoding, UTF_8};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use crate::error::CliError;

/// Where the HTML comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Read from standard input.
    Stdin,
    /// A local file.
    Path(PathBuf),
    /// An `http:` or `https:` URL.
    Remote(Url),
}

impl Source {
    /// Interpret the positional argument.
    ///
    /// `-` or no argument means stdin; `file:` URLs become paths. Anything
    /// that does not parse as a URL with a multi-letter scheme is a path, so
    /// Windows drive letters are not mistaken for schemes.
    pub fn resolve(input: Option<&str>) -> Result<Self, CliError> {
        let Some(input) = input.filter(|input| *input != "-") else {
            return Ok(Self::Stdin);
        };

        match Url::parse(input) {
            Ok(url) if url.scheme().len() > 1 => match url.scheme() {
                "http" | "https" => Ok(Self::Remote(url)),
                "file" => url
                    .to_file_path()
                    .map(Self::Path)
                    .map_err(|()| CliError::InvalidFileUrl(input.to_string())),
                scheme => Err(CliError::UnsupportedScheme(scheme.to_string())),
            },
            _ => Ok(Self::Path(PathBuf::from(input))),
        }
    }

    /// Read the source and decode it to text.
    pub fn load(&self, user_agent: &str) -> Result<String, CliError> {
        match self {
            Self::Stdin => {
                let mut bytes = Vec::new();
                io::stdin().read_to_end(&mut bytes).map_err(CliError::ReadStdin)?;
                Ok(decode(&bytes, None))
            }
            Self::Path(path) => {
                let bytes = fs::read(path).map_err(|source| CliError::ReadFile {
                    path: path.clone(),
                    source,
                })?;
                Ok(decode(&bytes, None))
            }
            Self::Remote(url) => fetch(url, user_agent),
        }
    }
}

fn fetch(url: &Url, user_agent: &str) -> Result<String, CliError> {
    let fetch_error = |source| CliError::Fetch {
        url: url.to_string(),
        source,
    };

    let client = Client::builder().user_agent(user_agent).build().map_err(fetch_error)?;
    let response = client
        .get(url.clone())
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(fetch_error)?;

    let charset = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(charset_from_content_type);
    debug!(%url, status = %response.status(), charset = ?charset, "fetched page");

    let bytes = response.bytes().map_err(fetch_error)?;
    Ok(decode(&bytes, charset.as_deref()))
}

/// Extract the `charset` parameter of a `Content-Type` header value.
fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}

/// Decode `bytes` using the declared charset, falling back to UTF-8.
///
/// A byte-order mark takes precedence over the declaration.
fn decode(bytes: &[u8], charset: Option<&str>) -> String {
    let encoding = charset
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}
