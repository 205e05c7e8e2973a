//! HTML templates

use crate::common::html_escape;

/// Login / registration page. `error` is escaped before rendering.
pub fn render_login_page(error: Option<&str>) -> String {
    let error_block = error
        .map(|msg| format!(r#"<div class="error" role="alert">{}</div>"#, html_escape(msg)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Sign in</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 420px; margin: 60px auto; padding: 0 20px; color: #111827; }}
        h1 {{ font-size: 24px; }}
        h2 {{ font-size: 18px; margin-top: 32px; }}
        form {{ display: flex; flex-direction: column; gap: 10px; }}
        input {{ padding: 10px; border: 1px solid #d1d5db; border-radius: 6px; font-size: 15px; }}
        button {{ padding: 10px; border: none; border-radius: 6px; background: #4f46e5; color: white; font-size: 15px; cursor: pointer; }}
        button.google {{ background: white; color: #111827; border: 1px solid #d1d5db; width: 100%; margin-top: 24px; }}
        .error {{ background: #fef2f2; border: 1px solid #fecaca; color: #b91c1c; padding: 12px; border-radius: 6px; margin-bottom: 16px; }}
        .status {{ margin-top: 12px; color: #047857; }}
    </style>
</head>
<body>
    <h1>Sign in</h1>
    {error_block}
    <form id="login-form" method="post" action="/auth/login">
        <input type="email" name="email" placeholder="Email" required>
        <input type="password" name="password" placeholder="Password" required>
        <button type="submit">Log in</button>
    </form>
    <div id="login-status" class="status"></div>

    <button class="google" id="google-login" type="button">Sign in with Google</button>

    <h2>Create an account</h2>
    <form method="post" action="/auth/register">
        <input type="email" name="email" placeholder="Email" required>
        <input type="password" name="password" placeholder="Password (min. 6 characters)" minlength="6" required>
        <button type="submit">Register</button>
    </form>

    <script>
        document.getElementById('login-form').addEventListener('submit', async (event) => {{
            event.preventDefault();
            const form = new FormData(event.target);
            const response = await fetch('/auth/login', {{
                method: 'POST',
                headers: {{ 'Content-Type': 'application/json' }},
                body: JSON.stringify({{ email: form.get('email'), password: form.get('password') }}),
            }});
            const body = await response.json();
            document.getElementById('login-status').textContent =
                response.ok ? body.message : (body.error || 'Login failed');
        }});
        document.getElementById('google-login').addEventListener('click', async () => {{
            const response = await fetch('/auth/google/login');
            const body = await response.json();
            window.location.href = body.url;
        }});
    </script>
</body>
</html>"#,
        error_block = error_block
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_page_without_error() {
        let html = render_login_page(None);

        assert!(html.contains(r#"action="/auth/login""#));
        assert!(html.contains(r#"action="/auth/register""#));
        assert!(!html.contains(r#"class="error""#));
    }

    #[test]
    fn test_login_page_escapes_error() {
        let html = render_login_page(Some("<b>taken</b>"));

        assert!(html.contains("&lt;b&gt;taken&lt;/b&gt;"));
        assert!(!html.contains("<b>taken</b>"));
    }
}
