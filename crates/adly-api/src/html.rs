use std::fmt::Write;

use axum::response::Html;

use adly_types::models::{Ad, AdStatus};
use adly_types::routes::Route;
use adly_types::validate::{AdInput, Field, FieldErrors};

pub struct FormView<'a> {
    pub heading: &'a str,
    pub intro: &'a str,
    pub action: String,
    pub submit_label: &'a str,
    /// Echoed back as typed so nothing is lost on a failed submit.
    pub values: &'a AdInput,
    pub errors: &'a FieldErrors,
    pub submit_error: Option<&'a str>,
}

/// Every user-supplied string in a page goes through here.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{} · Adly</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    ))
}

fn banner(message: &str) -> String {
    format!("<div class=\"banner error\" role=\"alert\">{}</div>\n", escape(message))
}

fn nav() -> String {
    format!(
        "<nav><a href=\"{}\">Adly</a> \
         <form method=\"post\" action=\"/auth/sign-out\" class=\"inline\"><button type=\"submit\">Sign out</button></form></nav>\n",
        Route::Dashboard
    )
}

pub fn sign_in_page(error: Option<&str>) -> Html<String> {
    let mut body = String::new();
    if let Some(error) = error {
        body.push_str(&banner(error));
    }
    body.push_str(
        "<h1>Adly</h1>\n<p>Sign in to manage your ads</p>\n\
         <a class=\"button\" href=\"/auth/google\">Continue with Google</a>\n\
         <p>Sign in with your Google account to get started</p>\n",
    );
    layout("Sign in", &body)
}

pub fn dashboard_page(ads: &[Ad], error: Option<&str>) -> Html<String> {
    let mut body = nav();
    let _ = write!(
        body,
        "<h1>My Ads</h1>\n<a class=\"button\" href=\"{}\">Create New Ad</a>\n",
        Route::CreateAd
    );
    if let Some(error) = error {
        body.push_str(&banner(error));
    }

    if ads.is_empty() {
        let _ = write!(
            body,
            "<div class=\"empty\"><p>No ads yet</p><p>Create your first ad to get started</p>\
             <a class=\"button\" href=\"{}\">Create Your First Ad</a></div>\n",
            Route::CreateAd
        );
    } else {
        body.push_str("<ul class=\"ads\">\n");
        for ad in ads {
            let _ = write!(
                body,
                "<li class=\"ad\" id=\"ad-{id}\">\n<h3>{title}</h3> <span class=\"status {status}\">{status}</span>\n\
                 <p>{description}</p>\n<p class=\"url\">{url}</p>\n<time datetime=\"{ts}\">{date}</time>\n\
                 <a href=\"{edit}\">Edit</a> <a href=\"{delete}\">Delete</a>\n</li>\n",
                id = escape(&ad.id),
                title = escape(&ad.title),
                status = ad.status,
                description = escape(&ad.description),
                url = escape(&ad.destination_url),
                ts = ad.created_at.to_rfc3339(),
                date = ad.created_at.format("%Y-%m-%d"),
                edit = escape(&Route::EditAd(ad.id.clone()).path()),
                delete = escape(&Route::DeleteAd(ad.id.clone()).path()),
            );
        }
        body.push_str("</ul>\n");
    }

    layout("My Ads", &body)
}

pub fn form_page(view: FormView<'_>) -> Html<String> {
    let mut body = nav();
    let _ = write!(body, "<h1>{}</h1>\n<p>{}</p>\n", escape(view.heading), escape(view.intro));
    if let Some(error) = view.submit_error {
        body.push_str(&banner(error));
    }

    let _ = write!(body, "<form method=\"post\" action=\"{}\">\n", escape(&view.action));
    text_input(&mut body, Field::Title, "Ad Title *", &view.values.title, view.errors, false);
    text_input(
        &mut body,
        Field::Description,
        "Description *",
        &view.values.description,
        view.errors,
        true,
    );
    text_input(
        &mut body,
        Field::DestinationUrl,
        "Destination URL *",
        &view.values.destination_url,
        view.errors,
        false,
    );

    body.push_str("<label for=\"status\">Status</label>\n<select id=\"status\" name=\"status\">\n");
    for status in AdStatus::ALL {
        let selected = if view.values.get(Field::Status) == status.as_str() { " selected" } else { "" };
        let label = match status {
            AdStatus::Active => "Active",
            AdStatus::Inactive => "Inactive",
        };
        let _ = writeln!(body, "<option value=\"{}\"{}>{}</option>", status, selected, label);
    }
    body.push_str("</select>\n");
    field_error(&mut body, Field::Status, view.errors);

    let _ = write!(
        body,
        "<button type=\"submit\">{}</button> <a href=\"{}\">Cancel</a>\n</form>\n",
        escape(view.submit_label),
        Route::Dashboard
    );

    layout(view.heading, &body)
}

pub fn delete_confirm_page(ad: &Ad) -> Html<String> {
    let mut body = nav();
    let _ = write!(
        body,
        "<h1>Delete ad</h1>\n<p>Are you sure you want to delete this ad?</p>\n<p><strong>{}</strong></p>\n\
         <form method=\"post\" action=\"{}\"><button type=\"submit\">Delete</button> \
         <a href=\"{}\">Cancel</a></form>\n",
        escape(&ad.title),
        escape(&Route::DeleteAd(ad.id.clone()).path()),
        Route::Dashboard
    );
    layout("Delete ad", &body)
}

/// Shown for absent and foreign ads alike.
pub fn not_found_page(message: &str) -> Html<String> {
    let mut body = nav();
    let _ = write!(
        body,
        "<h2>Ad Not Found</h2>\n<p>{}</p>\n<a class=\"button\" href=\"{}\">Back to Dashboard</a>\n",
        escape(message),
        Route::Dashboard
    );
    layout("Ad not found", &body)
}

pub fn error_page(message: &str) -> Html<String> {
    let mut body = nav();
    let _ = write!(
        body,
        "<h2>Error</h2>\n<p>{}</p>\n<a class=\"button\" href=\"{}\">Back to Dashboard</a>\n",
        escape(message),
        Route::Dashboard
    );
    layout("Error", &body)
}

fn text_input(out: &mut String, field: Field, label: &str, value: &str, errors: &FieldErrors, multiline: bool) {
    let name = field.as_str();
    let invalid = if errors.get(field).is_some() { " aria-invalid=\"true\"" } else { "" };
    let _ = writeln!(out, "<label for=\"{name}\">{}</label>", escape(label));
    if multiline {
        let _ = writeln!(
            out,
            "<textarea id=\"{name}\" name=\"{name}\" rows=\"4\"{invalid}>{}</textarea>",
            escape(value)
        );
    } else {
        let kind = if field == Field::DestinationUrl { "url" } else { "text" };
        let _ = writeln!(
            out,
            "<input id=\"{name}\" name=\"{name}\" type=\"{kind}\" value=\"{}\"{invalid}>",
            escape(value)
        );
    }
    field_error(out, field, errors);
}

fn field_error(out: &mut String, field: Field, errors: &FieldErrors) {
    if let Some(message) = errors.get(field) {
        let _ = writeln!(out, "<p class=\"field-error\" id=\"{}-error\">{}</p>", field, escape(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adly_types::validate::TITLE_TOO_SHORT;
    use uuid::Uuid;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
    }

    #[test]
    fn form_echoes_values_and_errors() {
        let values = AdInput {
            title: "AB".into(),
            description: "<b>bold</b> claims".into(),
            destination_url: "https://example.com".into(),
            status: Some("inactive".into()),
        };
        let mut errors = FieldErrors::new();
        errors.insert(Field::Title, TITLE_TOO_SHORT);

        let Html(page) = form_page(FormView {
            heading: "Create New Ad",
            intro: "Fill out the form below.",
            action: Route::CreateAd.path(),
            submit_label: "Create Ad",
            values: &values,
            errors: &errors,
            submit_error: None,
        });

        assert!(page.contains("value=\"AB\""));
        assert!(page.contains(TITLE_TOO_SHORT));
        assert!(page.contains("&lt;b&gt;bold&lt;/b&gt; claims"));
        assert!(page.contains("<option value=\"inactive\" selected>"));
    }

    #[test]
    fn empty_dashboard_invites_first_ad() {
        let Html(page) = dashboard_page(&[], Some("Failed to fetch ads"));
        assert!(page.contains("No ads yet"));
        assert!(page.contains("Failed to fetch ads"));
    }

    #[test]
    fn dashboard_links_edit_and_delete() {
        let ad = Ad {
            id: "ad-1".into(),
            title: "Winter boots".into(),
            description: "Warm and waterproof".into(),
            destination_url: "https://boots.example".into(),
            status: AdStatus::Active,
            user_id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
        };
        let Html(page) = dashboard_page(std::slice::from_ref(&ad), None);
        assert!(page.contains("/dashboard/edit/ad-1"));
        assert!(page.contains("/dashboard/delete/ad-1"));
        assert!(page.contains("Winter boots"));
    }
}
