/// Ensures URL ends without a trailing slash
///
/// # Examples
/// ```
/// use summarize::utils::uri::ensure_no_trailing_slash;
/// assert_eq!(ensure_no_trailing_slash("https://router.huggingface.co/hf-inference/"), "https://router.huggingface.co/hf-inference");
///
/// // Works with owned String too
/// let url = String::from("http://localhost:8080//");
/// assert_eq!(ensure_no_trailing_slash(url), "http://localhost:8080");
/// ```
pub fn ensure_no_trailing_slash<S>(url: S) -> String
where
    S: Into<String>,
{
    let mut url = url.into();
    let trimmed_len = url.trim_end_matches('/').len();
    url.truncate(trimmed_len);
    url
}
