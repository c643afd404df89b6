//! Server-side HTML for the listing page.
//!
//! One page shows the search box, an error banner, the add form, and one
//! row per item with inline edit and delete forms. HTML forms can only
//! `POST`, so edits and deletes post to `/items/{id}?_method=PUT|DELETE`.

use std::fmt::Write;

use stockroom_core::models::Item;
use stockroom_core::service::Listing;
use url::form_urlencoded::byte_serialize;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn encode_component(input: &str) -> String {
    byte_serialize(input.as_bytes()).collect()
}

fn field(value: &Option<String>) -> String {
    escape(value.as_deref().unwrap_or_default())
}

fn render_row(out: &mut String, item: &Item) {
    let action = format!("/items/{}", encode_component(&item.id));
    let _ = write!(
        out,
        r#"      <tr>
        <td>
          <form class="edit" method="post" action="{action}?_method=PUT">
            <input name="name" value="{name}" aria-label="Name">
            <input name="category" value="{category}" aria-label="Category">
            <input name="location" value="{location}" aria-label="Location">
            <button type="submit">Save</button>
          </form>
        </td>
        <td><time datetime="{iso}">{created}</time></td>
        <td>
          <form class="delete" method="post" action="{action}?_method=DELETE">
            <button type="submit">Delete</button>
          </form>
        </td>
      </tr>
"#,
        action = escape(&action),
        name = field(&item.name),
        category = field(&item.category),
        location = field(&item.location),
        iso = item.created_at.to_rfc3339(),
        created = item.created_at.format("%Y-%m-%d %H:%M"),
    );
}

/// Render the full listing page.
pub fn render_listing(listing: &Listing) -> String {
    let mut out = String::with_capacity(2048 + listing.items.len() * 768);

    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Inventory</title>
</head>
<body>
  <h1>Inventory</h1>
  <form class="search" method="get" action="/">
    <input type="search" name="q" value="{q}" placeholder="Search name or category">
    <button type="submit">Search</button>
  </form>
"#,
        q = escape(&listing.search_query),
    );

    if let Some(error) = &listing.error {
        let _ = writeln!(out, r#"  <p class="error" role="alert">{}</p>"#, escape(error));
    }

    out.push_str(
        r#"  <form class="add" method="post" action="/add-item">
    <input name="name" placeholder="Name">
    <input name="category" placeholder="Category">
    <input name="location" placeholder="Location">
    <button type="submit">Add</button>
  </form>
"#,
    );

    if listing.items.is_empty() {
        out.push_str("  <p class=\"empty\">No items.</p>\n");
    } else {
        out.push_str(
            "  <table>\n    <thead><tr><th>Item</th><th>Added</th><th></th></tr></thead>\n    <tbody>\n",
        );
        for item in &listing.items {
            render_row(&mut out, item);
        }
        out.push_str("    </tbody>\n  </table>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}
