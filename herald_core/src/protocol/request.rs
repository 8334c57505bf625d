/**
 * Outbound request descriptors.
 *
 * A `SendRequest` is one fully-built `sendMessage` call for one recipient:
 *
 * ```text
 * POST {api_base}/bot{token}/sendMessage?chat_id={chat_id}&text={text}
 * ```
 *
 * The query string is form-encoded by `url`, so arbitrary message text
 * (spaces, `&`, `#`, emoji) survives the trip. The request has no body.
 *
 * The URL embeds the bot token, so `Debug` deliberately prints only the host
 * and the recipient.
 */
use std::fmt;

use url::Url;

use super::constants::SEND_MESSAGE_METHOD;
use crate::error::{DispatchError, SendError};

/// HTTP method of every `sendMessage` call.
pub const METHOD: &str = "POST";

/// One queued message for one recipient.
#[derive(Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub(crate) chat_id: String,
    pub(crate) url: Url,
}

impl SendRequest {
    /**
     * Builds the request for `chat_id`.
     *
     * Fails with `SendError::Construction` when the recipient is blank or
     * when `api_base` and `bot_token` do not combine into a usable
     * `sendMessage` URL (unparsable base, token containing `/`, `?` or `#`, ...).
     */
    pub fn build(
        api_base: &str,
        bot_token: &str,
        chat_id: &str,
        text: &str,
    ) -> Result<Self, SendError> {
        let construction = |reason: String| SendError::Construction {
            chat_id: chat_id.to_string(),
            reason,
        };

        if chat_id.trim().is_empty() {
            return Err(construction("chat ID is empty".into()));
        }

        // The token must stay a single path segment; `/` or `\` would let
        // dot segments rewrite the path and drop it.
        if bot_token.contains(['/', '\\', '?', '#']) || bot_token.chars().any(char::is_control) {
            return Err(construction("bot token contains URL path delimiters".into()));
        }

        let endpoint = format!(
            "{}/bot{}/{}",
            api_base.trim_end_matches('/'),
            bot_token,
            SEND_MESSAGE_METHOD
        );

        let url = Url::parse_with_params(&endpoint, &[("chat_id", chat_id), ("text", text)])
            .map_err(|e| construction(format!("invalid URL: {e}")))?;

        let request = Self {
            chat_id: chat_id.to_string(),
            url,
        };

        request
            .check_well_formed()
            .map_err(|e| construction(e.to_string()))?;

        Ok(request)
    }

    /// Recipient this request is addressed to.
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Full request URL. Contains the bot token, never log it.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Always `POST`.
    pub fn method(&self) -> &'static str {
        METHOD
    }

    /**
     * Verifies the request still has the shape the dispatcher expects:
     * an http(s) URL with a host, a path ending in `bot{token}/sendMessage`,
     * no fragment, and a non-empty recipient.
     *
     * `build` never produces anything else; the dispatcher runs this check
     * again on every popped item and skips the ones that fail.
     */
    pub fn check_well_formed(&self) -> Result<(), DispatchError> {
        if self.chat_id.trim().is_empty() {
            return Err(DispatchError::Malformed("empty chat ID".into()));
        }

        if !matches!(self.url.scheme(), "http" | "https") {
            return Err(DispatchError::Malformed(format!(
                "unsupported URL scheme {:?}",
                self.url.scheme()
            )));
        }

        if self.url.host_str().is_none_or(str::is_empty) {
            return Err(DispatchError::Malformed("URL has no host".into()));
        }

        let path_ok = self.url.path_segments().is_some_and(|mut segments| {
            segments.next_back() == Some(SEND_MESSAGE_METHOD)
                && segments
                    .next_back()
                    .and_then(|segment| segment.strip_prefix("bot"))
                    .is_some_and(|token| !token.is_empty())
        });

        if !path_ok || self.url.fragment().is_some() {
            return Err(DispatchError::Malformed(
                "bot token produced a malformed sendMessage path".into(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for SendRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendRequest")
            .field("method", &METHOD)
            .field("host", &self.url.host_str())
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://api.telegram.org";
    const TOKEN: &str = "123456:ABC-DEF";

    fn query(request: &SendRequest, key: &str) -> Option<String> {
        request
            .url()
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_build_embeds_token_recipient_and_text() {
        let request = SendRequest::build(BASE, TOKEN, "42", "hello").unwrap();

        assert_eq!(request.method(), "POST");
        assert_eq!(request.chat_id(), "42");
        assert_eq!(request.url().host_str(), Some("api.telegram.org"));
        assert_eq!(request.url().path(), "/bot123456:ABC-DEF/sendMessage");
        assert_eq!(query(&request, "chat_id").as_deref(), Some("42"));
        assert_eq!(query(&request, "text").as_deref(), Some("hello"));
    }

    /**
     * Characters that would break a naively formatted query string must be
     * escaped and decode back to the original text.
     */
    #[test]
    fn test_build_escapes_message_text() {
        let text = "price & volume #1 ?? 50% up 🚀";
        let request = SendRequest::build(BASE, TOKEN, "-100200", text).unwrap();

        let raw_query = request.url().query().unwrap();
        assert!(!raw_query.contains('#'));
        assert!(!raw_query.contains(' '));
        assert_eq!(query(&request, "text").as_deref(), Some(text));
        assert_eq!(query(&request, "chat_id").as_deref(), Some("-100200"));
    }

    #[test]
    fn test_build_tolerates_trailing_slash_in_base() {
        let request = SendRequest::build("http://127.0.0.1:8080/", TOKEN, "1", "x").unwrap();
        assert_eq!(request.url().path(), "/bot123456:ABC-DEF/sendMessage");
    }

    #[test]
    fn test_build_rejects_empty_chat_id() {
        let err = SendRequest::build(BASE, TOKEN, "  ", "x").unwrap_err();
        assert!(matches!(err, SendError::Construction { .. }));
    }

    #[test]
    fn test_build_rejects_unparsable_base() {
        let err = SendRequest::build("not a url", TOKEN, "1", "x").unwrap_err();
        match err {
            SendError::Construction { chat_id, reason } => {
                assert_eq!(chat_id, "1");
                assert!(reason.contains("invalid URL"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_build_rejects_token_that_breaks_path() {
        assert!(SendRequest::build(BASE, "12?x", "1", "x").is_err());
        assert!(SendRequest::build(BASE, "12#x", "1", "x").is_err());
    }

    /**
     * Dot segments in the token would be normalized away by the URL parser,
     * leaving a `sendMessage` path without the credential.
     */
    #[test]
    fn test_build_rejects_token_with_path_segments() {
        for token in ["/../x", "12/../34", "12\\..\\34", "12\n34"] {
            let err = SendRequest::build(BASE, token, "1", "hi").unwrap_err();
            assert!(
                matches!(err, SendError::Construction { .. }),
                "token {token:?} was accepted"
            );
        }
    }

    #[test]
    fn test_check_well_formed_requires_token_segment() {
        let mut request = SendRequest::build(BASE, TOKEN, "1", "x").unwrap();
        request.url.set_path("/x/sendMessage");

        assert!(matches!(
            request.check_well_formed(),
            Err(DispatchError::Malformed(_))
        ));
    }

    #[test]
    fn test_build_rejects_non_http_scheme() {
        assert!(SendRequest::build("ftp://files.example.com", TOKEN, "1", "x").is_err());
    }

    #[test]
    fn test_check_well_formed_flags_tampered_request() {
        let mut request = SendRequest::build(BASE, TOKEN, "1", "x").unwrap();
        request.chat_id.clear();

        assert!(matches!(
            request.check_well_formed(),
            Err(DispatchError::Malformed(_))
        ));
    }

    #[test]
    fn test_debug_never_shows_token() {
        let request = SendRequest::build(BASE, TOKEN, "77", "secret text").unwrap();
        let printed = format!("{request:?}");

        assert!(!printed.contains(TOKEN));
        assert!(printed.contains("77"));
        assert!(printed.contains("api.telegram.org"));
    }
}
