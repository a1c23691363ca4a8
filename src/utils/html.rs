/// Sanitizes free text authored by admins (quiz descriptions, question and
/// choice texts) before it is stored.
///
/// Whitelist based: harmless markup such as <b> survives, <script> and
/// event-handler attributes are stripped. Plain text passes through
/// unchanged apart from entity escaping of `<`, `>` and `&`.
pub fn sanitize_text(input: &str) -> String {
    ammonia::clean(input.trim())
}
