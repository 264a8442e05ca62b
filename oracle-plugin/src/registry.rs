//! Export registry for the plugin module.
//!
//! The host finds each piece of the plugin by a well-known role name and
//! instantiates it around a bound object it owns. Every role must be bound
//! before the module is handed to the host.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use common::errors::{AppError, AppResult};

/// Roles the host plugin loader looks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PluginRole {
    /// Query execution and connection handling.
    Datasource,
    /// Metric query editor.
    QueryCtrl,
    /// Connection configuration editor.
    ConfigCtrl,
    /// Annotation query editor.
    AnnotationsQueryCtrl,
}

impl PluginRole {
    /// All roles a module must bind.
    pub const ALL: [PluginRole; 4] = [
        PluginRole::Datasource,
        PluginRole::QueryCtrl,
        PluginRole::ConfigCtrl,
        PluginRole::AnnotationsQueryCtrl,
    ];

    /// Export name the host uses for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginRole::Datasource => "Datasource",
            PluginRole::QueryCtrl => "QueryCtrl",
            PluginRole::ConfigCtrl => "ConfigCtrl",
            PluginRole::AnnotationsQueryCtrl => "AnnotationsQueryCtrl",
        }
    }
}

impl fmt::Display for PluginRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PluginRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AppError::UnknownExport(s.to_string()))
    }
}

/// A plugin piece instantiated by the host around its bound object.
pub trait PluginComponent: Send + Sync {
    /// Canonical implementation name.
    fn name(&self) -> &'static str;

    /// View template the host renders around the component, if any.
    fn template_url(&self) -> Option<&'static str>;

    /// Bound object as the host reads it back.
    fn bound_state(&self) -> AppResult<Value>;
}

/// Boxed component.
pub type BoxedComponent = Box<dyn PluginComponent>;

/// Function that constructs a component from a host bound object.
pub type ComponentFactory = fn(Value) -> AppResult<BoxedComponent>;

/// Static description of one implementation.
#[derive(Debug, Clone, Copy)]
pub struct ComponentInfo {
    /// Canonical implementation name.
    pub implementation: &'static str,
    /// View template, for editors.
    pub template_url: Option<&'static str>,
    /// Constructor.
    pub factory: ComponentFactory,
}

/// A named binding in the module's export surface.
#[derive(Debug, Clone, Copy)]
pub struct Export {
    /// Export name.
    pub name: &'static str,
    /// Role, when the binding is a role binding rather than a canonical name.
    pub role: Option<PluginRole>,
    /// Bound implementation.
    pub info: ComponentInfo,
}

/// Serializable view of an export, for listing.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDescriptor {
    /// Export name.
    pub name: &'static str,
    /// Role, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<PluginRole>,
    /// Canonical implementation name.
    pub implementation: &'static str,
    /// View template, for editors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_url: Option<&'static str>,
}

impl From<&Export> for ExportDescriptor {
    fn from(export: &Export) -> Self {
        Self {
            name: export.name,
            role: export.role,
            implementation: export.info.implementation,
            template_url: export.info.template_url,
        }
    }
}

/// Immutable, validated export surface of the plugin.
#[derive(Debug)]
pub struct PluginModule {
    exports: BTreeMap<&'static str, Export>,
}

impl PluginModule {
    /// Starts building a module.
    pub fn builder() -> ModuleBuilder {
        ModuleBuilder::default()
    }

    /// Looks up an export by name.
    ///
    /// # Errors
    /// Returns `AppError::UnknownExport` if nothing is bound under `name`.
    pub fn get(&self, name: &str) -> AppResult<&Export> {
        self.exports
            .get(name)
            .ok_or_else(|| AppError::UnknownExport(name.to_string()))
    }

    /// Looks up the implementation bound to a role.
    pub fn resolve(&self, role: PluginRole) -> AppResult<&ComponentInfo> {
        self.get(role.as_str()).map(|export| &export.info)
    }

    /// Instantiates the export `name` around a host bound object.
    pub fn instantiate(&self, name: &str, bound: Value) -> AppResult<BoxedComponent> {
        let export = self.get(name)?;
        tracing::debug!(
            export = name,
            implementation = export.info.implementation,
            "Instantiating plugin component"
        );
        (export.info.factory)(bound)
    }

    /// All exports, ordered by name.
    pub fn exports(&self) -> impl Iterator<Item = &Export> {
        self.exports.values()
    }

    /// Export names, ordered.
    pub fn names(&self) -> Vec<&'static str> {
        self.exports.keys().copied().collect()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.exports.len()
    }

    /// Whether the module binds nothing.
    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

/// Collects exports and validates them into a [`PluginModule`].
#[derive(Debug, Default)]
pub struct ModuleBuilder {
    exports: BTreeMap<&'static str, Export>,
}

impl ModuleBuilder {
    /// Binds an implementation under a role name.
    pub fn export_role(mut self, role: PluginRole, info: ComponentInfo) -> Self {
        self.exports.insert(
            role.as_str(),
            Export {
                name: role.as_str(),
                role: Some(role),
                info,
            },
        );
        self
    }

    /// Binds an implementation under an arbitrary name, usually its canonical one.
    pub fn export_as(mut self, name: &'static str, info: ComponentInfo) -> Self {
        self.exports.insert(name, Export { name, role: None, info });
        self
    }

    /// Validates that every role is bound and freezes the module.
    ///
    /// # Errors
    /// Returns `AppError::MissingRole` naming the first unbound role.
    pub fn build(self) -> AppResult<PluginModule> {
        for role in PluginRole::ALL {
            let bound = self
                .exports
                .get(role.as_str())
                .is_some_and(|export| export.role == Some(role));
            if !bound {
                return Err(AppError::MissingRole(role.to_string()));
            }
        }
        tracing::info!(exports = self.exports.len(), "Plugin module validated");
        Ok(PluginModule {
            exports: self.exports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(Value);

    impl PluginComponent for Echo {
        fn name(&self) -> &'static str {
            "Echo"
        }

        fn template_url(&self) -> Option<&'static str> {
            None
        }

        fn bound_state(&self) -> AppResult<Value> {
            Ok(self.0.clone())
        }
    }

    fn echo(bound: Value) -> AppResult<BoxedComponent> {
        Ok(Box::new(Echo(bound)))
    }

    fn info() -> ComponentInfo {
        ComponentInfo {
            implementation: "Echo",
            template_url: None,
            factory: echo,
        }
    }

    fn full_builder() -> ModuleBuilder {
        PluginRole::ALL
            .into_iter()
            .fold(PluginModule::builder(), |builder, role| builder.export_role(role, info()))
    }

    #[test]
    fn test_role_round_trip() {
        for role in PluginRole::ALL {
            assert_eq!(role.as_str().parse::<PluginRole>().unwrap(), role);
        }
        assert!("Nope".parse::<PluginRole>().is_err());
    }

    #[test]
    fn test_build_requires_every_role() {
        let err = PluginModule::builder()
            .export_role(PluginRole::Datasource, info())
            .export_role(PluginRole::QueryCtrl, info())
            .export_role(PluginRole::ConfigCtrl, info())
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "plugin role not bound: AnnotationsQueryCtrl");
    }

    #[test]
    fn test_plain_name_does_not_satisfy_role() {
        let err = PluginModule::builder()
            .export_role(PluginRole::Datasource, info())
            .export_role(PluginRole::QueryCtrl, info())
            .export_role(PluginRole::AnnotationsQueryCtrl, info())
            .export_as("ConfigCtrl", info())
            .build()
            .unwrap_err();
        assert!(matches!(err, AppError::MissingRole(_)));
    }

    #[test]
    fn test_instantiate_and_lookup() {
        let module = full_builder().export_as("Echo", info()).build().unwrap();
        assert_eq!(module.len(), 5);
        assert!(!module.is_empty());

        let component = module.instantiate("Echo", Value::from(3)).unwrap();
        assert_eq!(component.bound_state().unwrap(), Value::from(3));
        assert_eq!(module.resolve(PluginRole::QueryCtrl).unwrap().implementation, "Echo");
        assert!(matches!(module.get("Missing"), Err(AppError::UnknownExport(_))));
    }

    #[test]
    fn test_descriptor_serialization() {
        let module = full_builder().build().unwrap();
        let export = module.get("ConfigCtrl").unwrap();
        let value = serde_json::to_value(ExportDescriptor::from(export)).unwrap();
        assert_eq!(value["role"], "ConfigCtrl");
        assert_eq!(value["implementation"], "Echo");
        assert!(value.get("template_url").is_none());
    }
}
