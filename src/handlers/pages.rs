//! HTML pages. Data is fetched client-side from the JSON endpoints.

use axum::response::Html;

const DASHBOARD_HTML: &str = include_str!("../../templates/storekeeper.html");
const EDIT_FORM_HTML: &str = include_str!("../../templates/storekeeper_put_form.html");

/// GET /storekeeper/
pub async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

/// GET /storekeeper/edit-form
pub async fn edit_form() -> Html<&'static str> {
    Html(EDIT_FORM_HTML)
}
