//! Resolution of relative references against a document location.
//!
//! A location is either a URL (`http://`, `https://`, `file://`, `data:`) or a
//! plain filesystem path. Stylesheet references found in a document are
//! resolved against the document's own location before loading.

/// Resolve `reference` against the location of the referring document.
///
/// Absolute URLs are returned unchanged. With no base the reference is
/// returned as is. Otherwise `.` and `..` segments are folded while joining
/// onto the directory part of `base`.
#[must_use]
pub fn resolve_reference(reference: &str, base: Option<&str>) -> String {
    if is_absolute_url(reference) {
        return reference.to_string();
    }
    let Some(base) = base else {
        return reference.to_string();
    };

    if let Some(rest) = reference.strip_prefix("//") {
        let scheme = base.split_once("://").map_or("http", |(scheme, _)| scheme);
        return format!("{scheme}://{rest}");
    }

    if reference.starts_with('/') {
        // Origin-relative for URLs, already absolute for paths.
        if let Some((scheme, after)) = base.split_once("://") {
            let host = after.split('/').next().unwrap_or_default();
            return format!("{scheme}://{host}{reference}");
        }
        return reference.to_string();
    }

    let (prefix, path) = match base.split_once("://") {
        Some((scheme, after)) => match after.split_once('/') {
            Some((host, path)) => (format!("{scheme}://{host}/"), path),
            None => (format!("{scheme}://{after}/"), ""),
        },
        None if base.starts_with('/') => ("/".to_string(), &base[1..]),
        None => (String::new(), base),
    };

    let mut segments: Vec<&str> = path.split('/').collect();
    // Drop the document name, keep its directory.
    let _ = segments.pop();
    for segment in reference.split('/') {
        match segment {
            "." => {}
            ".." => {
                let _ = segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.retain(|segment| !segment.is_empty());

    format!("{prefix}{}", segments.join("/"))
}

fn is_absolute_url(reference: &str) -> bool {
    ["http://", "https://", "file://", "data:"]
        .iter()
        .any(|scheme| reference.starts_with(scheme))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_reference_unchanged() {
        assert_eq!(
            resolve_reference("http://example.com/a.css", Some("doc.xml")),
            "http://example.com/a.css"
        );
    }

    #[test]
    fn test_relative_to_file() {
        assert_eq!(
            resolve_reference("style.xsl", Some("data/report.xml")),
            "data/style.xsl"
        );
        assert_eq!(
            resolve_reference("../css/site.css", Some("/srv/www/pages/index.html")),
            "/srv/www/css/site.css"
        );
    }

    #[test]
    fn test_relative_to_url() {
        assert_eq!(
            resolve_reference("site.css", Some("https://example.com/docs/page.html")),
            "https://example.com/docs/site.css"
        );
        assert_eq!(
            resolve_reference("/root.css", Some("https://example.com/docs/page.html")),
            "https://example.com/root.css"
        );
    }

    #[test]
    fn test_no_base() {
        assert_eq!(resolve_reference("a.css", None), "a.css");
    }
}
