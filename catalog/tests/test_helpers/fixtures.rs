//! Canned rows shaped like the hosted store's responses.
use serde_json::{json, Value};

pub fn blog_row(id: &str, category: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Post {id}"),
        "content": "<p>body</p>",
        "category": category,
        "subcategory": null,
        "author": "alice",
        "slug": format!("post-{id}"),
        "image_url": null,
        "featured": false,
        "featured_in_category": null,
        "popular": false,
        "view_count": 0,
        "share_count": 0,
        "average_rating": null,
        "created_at": created_at,
        "updated_at": created_at
    })
}

pub fn featured_blog_row(id: &str, category: &str, created_at: &str) -> Value {
    let mut row = blog_row(id, category, created_at);
    row["featured"] = json!(true);
    row
}

pub fn popular_blog_row(id: &str, category: &str, created_at: &str) -> Value {
    let mut row = blog_row(id, category, created_at);
    row["popular"] = json!(true);
    row
}

pub fn mobile_row(id: &str, name: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "brand": "Acme",
        "price": 699.0,
        "image_url": null,
        "display_specs": "6.1\" OLED",
        "processor": "Octa-core",
        "ram": "8 GB",
        "storage": "256 GB",
        "battery": "4500 mAh",
        "camera": "50 MP",
        "os": "Android 15",
        "created_at": created_at,
        "updated_at": created_at
    })
}
