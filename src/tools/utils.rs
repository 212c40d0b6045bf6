use url::Url;

/// Storefront used when the target is a bare search keyword
pub const DEFAULT_STOREFRONT: &str = "https://shopee.sg";

/// Turn user input into a URL to open.
///
/// Complete URLs pass through, bare domains get `https://`, and anything that does
/// not look like a domain is treated as a search keyword on `storefront`.
pub fn normalize_target(input: &str, storefront: &str) -> String {
    let trimmed = input.trim();

    if trimmed.starts_with("http://")
        || trimmed.starts_with("https://")
        || trimmed.starts_with("file://")
        || trimmed.starts_with("data:")
        || trimmed.starts_with("about:")
    {
        return trimmed.to_string();
    }

    if trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1") {
        return format!("http://{}", trimmed);
    }

    // A dot with no whitespace reads as a domain, e.g. "shopee.co.th/search?keyword=x"
    if trimmed.contains('.') && !trimmed.contains(char::is_whitespace) {
        return format!("https://{}", trimmed);
    }

    search_url(storefront, trimmed)
}

/// Search results URL for `keyword` on `storefront`
pub fn search_url(storefront: &str, keyword: &str) -> String {
    match Url::parse(storefront).and_then(|base| base.join("/search")) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("keyword", keyword);
            url.to_string()
        }
        Err(_) => format!("{}/search?keyword={}", storefront.trim_end_matches('/'), keyword.replace(' ', "+")),
    }
}
