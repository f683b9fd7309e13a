// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Form data collection and submission

use url::Url;

use crate::dom::Element;
use crate::error::{Error, Result};
use crate::http::{Request, Response};
use crate::network::Network;

/// Form snapshot taken at submit time
#[derive(Debug, Clone)]
pub struct Form {
    pub id: Option<String>,
    pub action: Option<String>,
    /// Upper-cased method, GET unless the form says POST
    pub method: String,
    /// Successful controls in document order
    pub fields: Vec<(String, String)>,
}

impl Form {
    /// Collect a form's successful controls
    ///
    /// `submitter` contributes its own name/value when it has a name; other
    /// submit buttons never do.
    pub fn from_element(form: &Element, submitter: Option<&Element>) -> Self {
        let mut fields = Vec::new();

        for control in form.query_selector_all("input, textarea, select, button") {
            let Some(name) = control.get_attribute("name") else {
                continue;
            };
            if name.is_empty() || control.disabled() {
                continue;
            }

            match control.local_name().as_str() {
                "button" => {
                    if submitter == Some(&control) {
                        fields.push((name, control.value().unwrap_or_default()));
                    }
                }
                "input" => match control.input_type().as_deref() {
                    Some("checkbox" | "radio") => {
                        if control.checked() {
                            let value = control.value().unwrap_or_else(|| "on".to_string());
                            fields.push((name, value));
                        }
                    }
                    Some("submit" | "image" | "button" | "reset" | "file") => {
                        if submitter == Some(&control) {
                            fields.push((name, control.value().unwrap_or_default()));
                        }
                    }
                    _ => fields.push((name, control.value().unwrap_or_default())),
                },
                _ => fields.push((name, control.value().unwrap_or_default())),
            }
        }

        Self {
            id: form.id(),
            action: form.get_attribute("action"),
            method: form
                .get_attribute("method")
                .unwrap_or_else(|| "GET".to_string())
                .to_uppercase(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Build the submission request
    pub fn to_request(&self, base_url: Option<&Url>) -> Result<Request> {
        let mut url = self.resolve_action(base_url)?;
        let pairs = self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()));

        if self.method == "POST" {
            Ok(Request::from_url(reqwest::Method::POST, url).form(pairs))
        } else {
            url.set_query(None);
            if !self.fields.is_empty() {
                url.query_pairs_mut().extend_pairs(pairs);
            }
            Ok(Request::from_url(reqwest::Method::GET, url))
        }
    }

    /// Submit through the network so interception rules apply
    pub async fn submit(&self, network: &Network, base_url: Option<&Url>) -> Result<Response> {
        let request = self.to_request(base_url)?;
        network.execute(request).await
    }

    fn resolve_action(&self, base_url: Option<&Url>) -> Result<Url> {
        let action = self.action.as_deref().unwrap_or("").trim();

        match base_url {
            Some(base) if action.is_empty() => Ok(base.clone()),
            Some(base) => Ok(base.join(action)?),
            None if action.is_empty() => Err(Error::navigation(
                "",
                None,
                "form has no action and the page has no location",
            )),
            None => Url::parse(action).map_err(|e| Error::navigation(action, None, e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    const FORM: &str = r#"
        <form id="f" action="/search" method="get">
            <input name="q" value="shelly go">
            <input type="checkbox" name="exact" value="yes" checked>
            <input type="checkbox" name="fuzzy">
            <input type="radio" name="size" value="s">
            <input type="radio" name="size" value="m" checked>
            <input name="gone" value="x" disabled>
            <select name="car"><option value="volvo">Volvo</option><option value="saab" selected>Saab</option></select>
            <textarea name="note">hello</textarea>
            <button type="submit" name="go" value="1">Go</button>
        </form>
    "#;

    fn form_element() -> Element {
        parse_html(FORM).unwrap().query_selector("#f").unwrap()
    }

    #[test]
    fn test_successful_controls() {
        let form = Form::from_element(&form_element(), None);
        assert_eq!(form.method, "GET");
        assert_eq!(form.field("q"), Some("shelly go"));
        assert_eq!(form.field("exact"), Some("yes"));
        assert_eq!(form.field("fuzzy"), None);
        assert_eq!(form.field("size"), Some("m"));
        assert_eq!(form.field("gone"), None);
        assert_eq!(form.field("car"), Some("saab"));
        assert_eq!(form.field("note"), Some("hello"));
        assert_eq!(form.field("go"), None);
    }

    #[test]
    fn test_submitter_included() {
        let element = form_element();
        let button = element.query_selector("button").unwrap();
        let form = Form::from_element(&element, Some(&button));
        assert_eq!(form.field("go"), Some("1"));
    }

    #[test]
    fn test_get_request_uses_query() {
        let form = Form::from_element(&form_element(), None);
        let base = Url::parse("https://app.test/home").unwrap();
        let request = form.to_request(Some(&base)).unwrap();
        assert_eq!(request.method, reqwest::Method::GET);
        assert_eq!(request.url.path(), "/search");
        let q: Vec<_> = request.url.query_pairs().collect();
        assert!(q.iter().any(|(k, v)| k == "q" && v == "shelly go"));
        assert!(request.body.is_none());
    }

    #[test]
    fn test_post_request_uses_body() {
        let doc = parse_html(
            r#"<form id="f" method="post" action="https://api.test/login"><input name="user" value="a b"></form>"#,
        )
        .unwrap();
        let form = Form::from_element(&doc.query_selector("#f").unwrap(), None);
        let request = form.to_request(None).unwrap();
        assert_eq!(request.method, reqwest::Method::POST);
        assert_eq!(request.body.as_deref(), Some(&b"user=a+b"[..]));
        assert_eq!(
            request.header_value("content-type"),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn test_relative_action_without_location() {
        let form = Form::from_element(&form_element(), None);
        assert!(matches!(form.to_request(None), Err(Error::Navigation { .. })));
    }
}
