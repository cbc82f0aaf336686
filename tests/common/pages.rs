use serde_json::{Value, json};

/// Sign-up page with every kind of control filled in.
pub fn filled_signup() -> Value {
    signup(true)
}

/// The same page, freshly loaded.
pub fn blank_signup() -> Value {
    signup(false)
}

fn signup(filled: bool) -> Value {
    let v = |s: &str| if filled { s.to_string() } else { String::new() };
    json!({
        "url": "https://example.com/signup",
        "title": "Sign up",
        "body": [
            { "tag": "h1", "text": "Create account" },
            { "tag": "form", "id": "signup", "children": [
                { "tag": "label", "for": "email", "text": " Email address " },
                { "tag": "input", "type": "email", "id": "email", "name": "email", "value": v("a@b.com") },
                { "tag": "label", "text": "I agree to the terms", "children": [
                    { "tag": "input", "type": "checkbox", "id": "agree", "name": "agree", "checked": filled }
                ]},
                { "tag": "input", "type": "checkbox", "id": "newsletter", "name": "newsletter" },
                { "tag": "input", "type": "radio", "id": "plan-basic", "name": "plan", "checked": !filled },
                { "tag": "input", "type": "radio", "id": "plan-pro", "name": "plan", "checked": filled },
                { "tag": "label", "text": "Phone" },
                { "tag": "span", "text": "(home, work)" },
                { "tag": "input", "className": "phone", "value": v("555-0100") },
                { "tag": "input", "className": "phone", "value": v("555-0199") },
                { "tag": "input", "type": "password", "id": "pw", "name": "pw", "value": v("hunter2") },
                { "tag": "input", "type": "text", "id": "nickname", "value": "" },
                { "tag": "textarea", "id": "bio", "name": "bio", "value": v("Hello there") },
                { "tag": "textarea", "id": "notes", "name": "notes" },
                { "tag": "select", "id": "country", "name": "country",
                  "options": ["", "us", "ca"], "value": v("ca") },
                { "tag": "input", "type": "file", "id": "avatar" },
                { "tag": "input", "type": "button", "id": "preview", "value": "Preview" },
                { "tag": "input", "type": "submit", "id": "go", "value": "Sign up" }
            ]}
        ]
    })
}

/// One checked checkbox and one named email input.
pub fn agree_and_email() -> Value {
    json!({
        "url": "https://example.com/newsletter",
        "title": "Newsletter",
        "body": [
            { "tag": "form", "children": [
                { "tag": "input", "type": "checkbox", "id": "agree", "checked": true },
                { "tag": "input", "type": "text", "name": "email", "value": "a@b.com" }
            ]}
        ]
    })
}

/// A page whose only input has `id="email"` and submits its form on change.
pub fn email_target() -> Value {
    json!({
        "url": "https://other.example.org/contact",
        "title": "Contact",
        "body": [
            { "tag": "form", "id": "contact", "children": [
                { "tag": "input", "type": "text", "id": "email", "submitOnChange": true }
            ]}
        ]
    })
}
