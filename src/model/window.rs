use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque token naming a window. Serialized as a bare string, which is also
/// how it appears as a leaf of a layout tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(String);

impl WindowId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    /// A random v4 token. Callers that need a guarantee against collisions
    /// go through [`crate::model::WindowRegistry::fresh_id`].
    pub fn random() -> Self { Self(uuid::Uuid::new_v4().to_string()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for WindowId {
    fn from(value: &str) -> Self { Self::new(value) }
}

/// What the command interpreter hands over when it wants a window opened.
///
/// `props` is carried through untouched; the renderer picked by `app_id`
/// is the only thing that looks inside it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSpec<P = serde_json::Value> {
    pub app_id: String,
    pub props: P,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_title: Option<String>,
}

impl<P> WindowSpec<P> {
    pub fn new(app_id: impl Into<String>, props: P) -> Self {
        Self {
            app_id: app_id.into(),
            props,
            command_string: None,
            custom_title: None,
        }
    }

    pub fn with_command_string(mut self, command: impl Into<String>) -> Self {
        self.command_string = Some(command.into());
        self
    }

    pub fn with_custom_title(mut self, title: impl Into<String>) -> Self {
        self.custom_title = Some(title.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowInstance<P = serde_json::Value> {
    pub id: WindowId,
    pub app_id: String,
    pub props: P,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

impl<P> WindowInstance<P> {
    pub fn from_spec(id: WindowId, spec: WindowSpec<P>) -> Self {
        Self {
            id,
            app_id: spec.app_id,
            props: spec.props,
            command_string: spec.command_string,
            custom_title: spec.custom_title,
            background_color: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn instance_takes_everything_from_spec() {
        let spec = WindowSpec::new("profile", json!({ "npub": "test" }))
            .with_command_string("profile test")
            .with_custom_title("Me");
        let window = WindowInstance::from_spec(WindowId::new("w1"), spec);

        assert_eq!(window.id, WindowId::new("w1"));
        assert_eq!(window.app_id, "profile");
        assert_eq!(window.props, json!({ "npub": "test" }));
        assert_eq!(window.command_string.as_deref(), Some("profile test"));
        assert_eq!(window.custom_title.as_deref(), Some("Me"));
        assert_eq!(window.background_color, None);
    }

    #[test]
    fn instance_serializes_without_absent_optionals() {
        let window = WindowInstance::from_spec(
            WindowId::new("w1"),
            WindowSpec::new("feed", json!({})),
        );
        assert_eq!(
            serde_json::to_value(&window).unwrap(),
            json!({ "id": "w1", "appId": "feed", "props": {} })
        );
    }

    #[test]
    fn random_ids_differ() {
        assert_ne!(WindowId::random(), WindowId::random());
    }
}
