//! Template manager service.
//!
//! Owns the embedded example artifacts and installs them into the
//! application tree on demand. Boot seeds the convention directory
//! layout; installs never overwrite existing files.

use std::any::Any;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bootsmith_core::error::{ServiceError, TemplateError};
use bootsmith_core::{BootContext, Service};
use bootsmith_loader::scaffold;
use tracing::info;

pub const SERVICE_NAME: &str = "template-manager";

pub struct TemplateService {
    app_root: PathBuf,
}

impl TemplateService {
    pub fn new(app_root: impl Into<PathBuf>) -> Self {
        Self {
            app_root: app_root.into(),
        }
    }

    /// Names of all embedded templates.
    pub fn template_names(&self) -> Vec<&'static str> {
        scaffold::TEMPLATES.iter().map(|(name, _, _)| *name).collect()
    }

    fn lookup(name: &str) -> Result<(&'static str, &'static str), TemplateError> {
        scaffold::TEMPLATES
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|(_, path, contents)| (*path, *contents))
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }

    /// Install one template at an explicit destination. Refuses to
    /// overwrite an existing file.
    pub fn install_file(&self, name: &str, dest: &Path) -> Result<(), TemplateError> {
        let (_, contents) = Self::lookup(name)?;
        if dest.exists() {
            return Err(TemplateError::Exists(dest.display().to_string()));
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, contents)?;
        info!("Installed template {} at {}", name, dest.display());
        Ok(())
    }

    /// Install one template at its conventional path under the
    /// application root.
    pub fn install_template(&self, name: &str) -> Result<PathBuf, TemplateError> {
        let (path, _) = Self::lookup(name)?;
        let dest = self.app_root.join(path);
        self.install_file(name, &dest)?;
        Ok(dest)
    }
}

#[async_trait]
impl Service for TemplateService {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn boot(&self, _ctx: &BootContext) -> Result<(), ServiceError> {
        let created = scaffold::ensure_layout(&self.app_root)?;
        if !created.is_empty() {
            info!(
                "Scaffolded {} convention directories under {}",
                created.len(),
                self.app_root.display()
            );
        }
        Ok(())
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
