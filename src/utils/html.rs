// src/utils/html.rs

/// Strips unsafe markup from author-supplied text using ammonia's whitelist.
///
/// Safe tags such as <b> and <p> survive; <script> is removed along with its content.
/// Quiz titles and descriptions pass through here before they are stored.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
