//! Turn wire statuses into template-ready posts.

use crate::client::{Attachment, Status};
use crate::model::{MediaAttachment, OriginalPost, Post};
use crate::timerange::{format_date, format_date_time, format_time};

/// Literal replacements applied before tag stripping. No pattern is a
/// prefix of another, so a first-match scan is unambiguous.
const BLOCK_REPLACEMENTS: &[(&str, &str)] = &[
    ("<p>", "\n\n"),
    ("</p>", ""),
    ("<br>", "\n"),
    ("<br/>", "\n"),
    ("<br />", "\n"),
];

/// Reduce Mastodon's HTML content to plain text.
///
/// Paragraphs become blank lines and `<br>` a newline, every other tag is
/// dropped, entities are decoded and the result is trimmed.
pub fn sanitize(content: &str) -> String {
    let replaced = replace_blocks(content);
    let stripped = strip_tags(replaced);
    html_escape::decode_html_entities(&terminate_legacy_entities(&stripped))
        .trim()
        .to_string()
}

/// Named references HTML5 still decodes without a trailing `;`.
const LEGACY_ENTITIES: &[&str] = &[
    "AElig", "AMP", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml", "COPY", "Ccedil",
    "ETH", "Eacute", "Ecirc", "Egrave", "Euml", "GT", "Iacute", "Icirc", "Igrave", "Iuml", "LT",
    "Ntilde", "Oacute", "Ocirc", "Ograve", "Oslash", "Otilde", "Ouml", "QUOT", "REG", "THORN",
    "Uacute", "Ucirc", "Ugrave", "Uuml", "Yacute", "aacute", "acirc", "acute", "aelig", "agrave",
    "amp", "aring", "atilde", "auml", "brvbar", "ccedil", "cedil", "cent", "copy", "curren",
    "deg", "divide", "eacute", "ecirc", "egrave", "eth", "euml", "frac12", "frac14", "frac34",
    "gt", "iacute", "icirc", "iexcl", "igrave", "iquest", "iuml", "laquo", "lt", "macr", "micro",
    "middot", "nbsp", "not", "ntilde", "oacute", "ocirc", "ograve", "ordf", "ordm", "oslash",
    "otilde", "ouml", "para", "plusmn", "pound", "quot", "raquo", "reg", "sect", "shy", "sup1",
    "sup2", "sup3", "szlig", "thorn", "times", "uacute", "ucirc", "ugrave", "uml", "uuml",
    "yacute", "yen", "yuml",
];

/// Add the missing `;` to references like `&amp b` or `&#39` so the decoder
/// treats them the way browsers do. For named references the longest legacy
/// prefix wins, so `&copyright` reads as `&copy;right`.
fn terminate_legacy_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..=amp]);
        rest = &rest[amp + 1..];

        let (body_len, numeric) = match rest.strip_prefix('#') {
            Some(num) => {
                let hex = num.starts_with(['x', 'X']);
                let digits = &num[usize::from(hex)..];
                let len = digits
                    .bytes()
                    .take_while(|b| if hex { b.is_ascii_hexdigit() } else { b.is_ascii_digit() })
                    .count();
                if len == 0 {
                    continue;
                }
                (1 + usize::from(hex) + len, true)
            }
            None => (rest.bytes().take_while(u8::is_ascii_alphanumeric).count(), false),
        };
        if body_len == 0 || rest[body_len..].starts_with(';') {
            continue;
        }

        let end = if numeric {
            body_len
        } else {
            match (2..=body_len)
                .rev()
                .find(|&len| LEGACY_ENTITIES.contains(&&rest[..len]))
            {
                Some(len) => len,
                None => continue,
            }
        };
        out.push_str(&rest[..end]);
        out.push(';');
        rest = &rest[end..];
    }

    out.push_str(rest);
    out
}

fn replace_blocks(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    'scan: while !rest.is_empty() {
        if rest.starts_with('<') {
            for (pattern, replacement) in BLOCK_REPLACEMENTS {
                if let Some(tail) = rest.strip_prefix(pattern) {
                    out.push_str(replacement);
                    rest = tail;
                    continue 'scan;
                }
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }

    out
}

/// Repeatedly cut the span from the first `<` to the first `>`. Stops as
/// soon as the first `>` comes before the first `<`, so stray brackets end
/// the loop instead of spinning on it.
fn strip_tags(mut content: String) -> String {
    while let (Some(open), Some(close)) = (content.find('<'), content.find('>')) {
        if open >= close {
            break;
        }
        content.replace_range(open..=close, "");
    }
    content
}

fn convert_media(attachments: &[Attachment]) -> Vec<MediaAttachment> {
    attachments
        .iter()
        .map(|a| MediaAttachment {
            media_type: a.media_type.clone(),
            url: a.url.clone(),
            preview_url: a.preview_url.clone().unwrap_or_default(),
            description: a.description.clone().unwrap_or_default(),
        })
        .collect()
}

fn original_post(status: &Status) -> OriginalPost {
    OriginalPost {
        author_name: status.account.display_name.clone(),
        author_username: status.account.username.clone(),
        author_url: status.account.url.clone(),
        content: sanitize(&status.content),
        content_warning: status.spoiler_text.clone(),
        url: status.url.clone().unwrap_or_default(),
        media_attachments: convert_media(&status.media_attachments),
    }
}

fn base_post(status: &Status) -> Post {
    Post {
        id: status.id.clone(),
        created_at: status.created_at,
        formatted_time: format_date_time(status.created_at),
        formatted_date: format_date(status.created_at),
        formatted_time_only: format_time(status.created_at),
        url: status.url.clone().unwrap_or_default(),
        content: String::new(),
        content_warning: String::new(),
        visibility: String::new(),
        is_reply: false,
        is_boost: false,
        is_favorited: false,
        media_attachments: Vec::new(),
        replies_count: 0,
        reblogs_count: 0,
        favourites_count: 0,
        boost_commentary: String::new(),
        original_post: None,
    }
}

/// Normalize a status from the account's own feed.
///
/// For a boost the sanitized content doubles as the boost commentary and the
/// boosted status becomes the [`OriginalPost`]; its media stays on the
/// snapshot and is not copied onto the outer post.
pub fn normalize(status: &Status) -> Post {
    let content = sanitize(&status.content);

    let mut post = Post {
        content_warning: status.spoiler_text.clone(),
        visibility: status.visibility.as_str().to_string(),
        is_reply: status.is_reply(),
        is_boost: status.is_boost(),
        replies_count: status.replies_count,
        reblogs_count: status.reblogs_count,
        favourites_count: status.favourites_count,
        ..base_post(status)
    };

    match &status.reblog {
        Some(target) => {
            post.boost_commentary = content.clone();
            post.original_post = Some(original_post(target));
        }
        None => post.media_attachments = convert_media(&status.media_attachments),
    }
    post.content = content;

    post
}

/// Normalize a status taken from the favourites endpoint. The whole status
/// lives in the [`OriginalPost`].
pub fn normalize_favourite(status: &Status) -> Post {
    Post {
        is_favorited: true,
        original_post: Some(original_post(status)),
        ..base_post(status)
    }
}

pub fn normalize_all(statuses: &[Status]) -> Vec<Post> {
    statuses.iter().map(normalize).collect()
}

pub fn normalize_favourites(statuses: &[Status]) -> Vec<Post> {
    statuses.iter().map(normalize_favourite).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Visibility;
    use crate::testing::{attachment, status};

    #[test]
    fn test_sanitize_paragraphs() {
        assert_eq!(sanitize("<p>Hello</p><p>World</p>"), "Hello\n\nWorld");
    }

    #[test]
    fn test_sanitize_line_breaks() {
        assert_eq!(sanitize("one<br>two<br/>three<br />four"), "one\ntwo\nthree\nfour");
    }

    #[test]
    fn test_sanitize_strips_links_and_spans() {
        let html = r#"<p>Read <a href="https://example.com" rel="nofollow"><span class="invisible">https://</span><span>example.com</span></a> now</p>"#;
        assert_eq!(sanitize(html), "Read https://example.com now");
    }

    #[test]
    fn test_sanitize_unescapes_entities() {
        assert_eq!(
            sanitize("<p>Fish &amp; chips &lt;3 &#39;yum&#39; &quot;ok&quot;</p>"),
            "Fish & chips <3 'yum' \"ok\""
        );
    }

    #[test]
    fn test_sanitize_decodes_references_without_semicolon() {
        assert_eq!(sanitize("a &#128024; &amp b &copy"), "a 🐘 & b ©");
        assert_eq!(sanitize("&#39quoted&#x27 &copyright &ampx"), "'quoted' ©right &x");
        assert_eq!(sanitize("&bogus stays &amp; once"), "&bogus stays & once");
        assert_eq!(sanitize("R&D &# &; &"), "R&D &# &; &");
    }

    #[test]
    fn test_sanitize_stray_close_bracket_stops_stripping() {
        assert_eq!(sanitize("a > b <i>c</i>"), "a > b <i>c</i>");
    }

    #[test]
    fn test_sanitize_unclosed_tag_kept() {
        assert_eq!(sanitize("<b>bold</b> and <unclosed"), "bold and <unclosed");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for html in [
            "<p>Hello</p><p>World</p>",
            "<p>a<br>b</p>",
            r#"<p><a href="x">#tag</a> text</p>"#,
            "plain text",
            "",
        ] {
            let once = sanitize(html);
            assert_eq!(sanitize(&once), once, "input {html:?}");
        }
    }

    #[test]
    fn test_sanitize_non_ascii() {
        assert_eq!(sanitize("<p>héllo 🐘</p><p>wörld</p>"), "héllo 🐘\n\nwörld");
    }

    #[test]
    fn test_normalize_own_post() {
        let mut raw = status("1", "2025-11-10T14:05:00Z");
        raw.content = "<p>Hello</p>".to_string();
        raw.spoiler_text = "cw".to_string();
        raw.visibility = Visibility::Unlisted;
        raw.in_reply_to_id = Some("0".to_string());
        raw.media_attachments = vec![attachment("m1")];
        raw.replies_count = 4;

        let post = normalize(&raw);
        assert_eq!(post.content, "Hello");
        assert_eq!(post.content_warning, "cw");
        assert_eq!(post.visibility, "unlisted");
        assert_eq!(post.formatted_time, "2025-11-10 14:05");
        assert_eq!(post.formatted_date, "2025-11-10");
        assert_eq!(post.formatted_time_only, "14:05");
        assert!(post.is_reply);
        assert!(!post.is_boost);
        assert!(!post.is_favorited);
        assert_eq!(post.media_attachments.len(), 1);
        assert_eq!(post.replies_count, 4);
        assert!(post.original_post.is_none());
        assert!(post.boost_commentary.is_empty());
    }

    #[test]
    fn test_normalize_keeps_server_visibility() {
        let mut raw = status("3", "2025-11-10T00:00:00Z");
        raw.visibility = Visibility::Other("limited".to_string());
        assert_eq!(normalize(&raw).visibility, "limited");
    }

    #[test]
    fn test_normalize_boost_keeps_media_on_original() {
        let mut target = status("9", "2025-11-01T00:00:00Z");
        target.account.username = "bob".to_string();
        target.account.display_name = "Bob".to_string();
        target.content = "<p>original &amp; good</p>".to_string();
        target.media_attachments = vec![attachment("a"), attachment("b")];

        let mut raw = status("10", "2025-11-10T00:00:00Z");
        raw.content = "<p>look</p>".to_string();
        raw.reblog = Some(Box::new(target));

        let post = normalize(&raw);
        assert!(post.is_boost);
        assert!(post.media_attachments.is_empty());
        assert_eq!(post.boost_commentary, "look");

        let original = post.original_post.expect("boost carries original");
        assert_eq!(original.author_username, "bob");
        assert_eq!(original.author_name, "Bob");
        assert_eq!(original.content, "original & good");
        assert_eq!(original.media_attachments.len(), 2);
    }

    #[test]
    fn test_normalize_favourite() {
        let mut raw = status("20", "2025-11-10T00:00:00Z");
        raw.content = "<p>liked</p>".to_string();
        raw.media_attachments = vec![attachment("a")];

        let post = normalize_favourite(&raw);
        assert!(post.is_favorited);
        assert!(!post.is_boost);
        assert!(post.content.is_empty());
        assert!(post.media_attachments.is_empty());

        let original = post.original_post.expect("favourite carries original");
        assert_eq!(original.content, "liked");
        assert_eq!(original.media_attachments.len(), 1);
    }
}
