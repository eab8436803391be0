use crate::error::{LandaxError, LandaxResult};
use std::collections::HashMap;

/// Module id and the DocumentLink field that carries the linked object's id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLink {
    pub module_id: u32,
    pub link_field: String,
}

/// Read-only lookup from module name to module id to link field
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    modules: HashMap<String, u32>,
    link_fields: HashMap<u32, String>,
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self {
            modules: HashMap::new(),
            link_fields: HashMap::from([
                (10, "CoworkerId".to_string()),
                (24, "EquipmentId".to_string()),
            ]),
        }
    }
}

impl ModuleRegistry {
    /// Registry over `modules` with the built-in link fields
    pub fn new(modules: HashMap<String, u32>) -> Self {
        Self {
            modules,
            ..Self::default()
        }
    }

    /// Parse a JSON object of module name to module id
    pub fn from_json_str(json: &str) -> LandaxResult<Self> {
        let modules: HashMap<String, u32> = serde_json::from_str(json)?;
        Ok(Self::new(modules))
    }

    pub fn with_module(mut self, name: impl Into<String>, module_id: u32) -> Self {
        self.modules.insert(name.into(), module_id);
        self
    }

    pub fn with_link_field(mut self, module_id: u32, field: impl Into<String>) -> Self {
        self.link_fields.insert(module_id, field.into());
        self
    }

    pub fn module_id(&self, name: &str) -> Option<u32> {
        self.modules.get(name).copied()
    }

    pub fn link_field(&self, module_id: u32) -> Option<&str> {
        self.link_fields.get(&module_id).map(String::as_str)
    }

    pub fn resolve(&self, name: &str) -> LandaxResult<ModuleLink> {
        let module_id = self
            .module_id(name)
            .ok_or_else(|| LandaxError::UnknownModule(name.to_string()))?;
        let link_field = self
            .link_field(module_id)
            .ok_or_else(|| LandaxError::UnmappedModule {
                module: name.to_string(),
                module_id,
            })?;

        Ok(ModuleLink {
            module_id,
            link_field: link_field.to_string(),
        })
    }
}
