//! Parsing of GitHub's `Link` pagination header.

/// Pagination information extracted from GitHub's Link header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPagination {
    /// The last page number (from rel="last" link).
    pub last_page: Option<u64>,
    /// The next page number (from rel="next" link).
    pub next_page: Option<u64>,
}

impl LinkPagination {
    /// Returns the total number of pages if known.
    pub fn total_pages(&self) -> Option<u64> {
        self.last_page
    }
}

/// Parse the Link header to extract pagination info.
///
/// GitHub Link headers look like:
/// `<https://api.github.com/repositories/1/commits?per_page=1&page=2>; rel="next", <...&page=7>; rel="last"`
pub fn parse_link_header(link_header: &str) -> LinkPagination {
    let mut info = LinkPagination::default();

    for part in link_header.split(',') {
        let part = part.trim();

        let mut url = None;
        let mut rel = None;

        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some(rel_value) = segment.strip_prefix("rel=") {
                rel = Some(rel_value.trim_matches('"'));
            }
        }

        if let (Some(url), Some(rel_type)) = (url, rel)
            && let Some(page_num) = extract_page_from_url(url)
        {
            match rel_type {
                "last" => info.last_page = Some(page_num),
                "next" => info.next_page = Some(page_num),
                _ => {}
            }
        }
    }

    info
}

/// Extract the page parameter from a URL.
fn extract_page_from_url(url: &str) -> Option<u64> {
    let query_start = url.find('?')?;
    let query = &url[query_start + 1..];

    for param in query.split('&') {
        if let Some(value) = param.strip_prefix("page=") {
            return value.parse().ok();
        }
    }

    None
}
