//! Attachment metadata query.

use chrono::NaiveDateTime;
use sqlx::MySqlPool;

/// One attachment with its uploader and parent page.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AttachmentRow {
    pub content_id: i64,
    pub attachment_title: Option<String>,
    pub uploaded_by: Option<String>,
    pub page_title: Option<String>,
    pub size: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
    pub status: Option<String>,
}

/// List every attachment that has a recorded size.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_attachments(pool: &MySqlPool) -> Result<Vec<AttachmentRow>, sqlx::Error> {
    sqlx::query_as::<_, AttachmentRow>(
        r"
        SELECT DISTINCT
            c.CONTENTID AS content_id,
            c.TITLE AS attachment_title,
            u.username AS uploaded_by,
            page.TITLE AS page_title,
            cp.LONGVAL AS size,
            c.CREATIONDATE AS created_at,
            c.CONTENT_STATUS AS status
        FROM CONTENT AS c
        JOIN user_mapping AS u ON u.user_key = c.CREATOR
        JOIN CONTENT AS page ON page.CONTENTID = c.PAGEID
        JOIN CONTENTPROPERTIES AS cp ON cp.CONTENTID = c.CONTENTID
        WHERE c.CONTENTTYPE = 'ATTACHMENT' AND cp.LONGVAL IS NOT NULL
        ORDER BY c.CONTENTID
        ",
    )
    .fetch_all(pool)
    .await
}
