use crate::authority::IssuedCredentials;
use crate::error::PkiError;
use log::info;
use minijinja::{Environment, context};
use secrecy::ExposeSecret;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Output files for one issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub certificate: PathBuf,
    pub private_key: PathBuf,
    pub rendered: Option<PathBuf>,
}

/// Writes `<cn>_cert.pem`, `<cn>_key.pem` and, with a template, the
/// rendered `<cn><template extension>` into `output_dir`.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
    template: Option<PathBuf>,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            template: None,
        }
    }

    pub fn with_template(mut self, template: Option<PathBuf>) -> Self {
        self.template = template;
        self
    }

    /// Computes the output paths, refusing names that would escape the
    /// output directory. Called before the authority is asked to issue.
    pub fn paths_for(&self, common_name: &str) -> Result<ArtifactPaths, PkiError> {
        if !is_safe_file_stem(common_name) {
            return Err(PkiError::Artifact {
                path: self.output_dir.join(common_name),
                message: "common name is not usable as a file name".to_string(),
            });
        }

        let rendered = self.template.as_ref().map(|template| {
            let extension = template
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default();
            self.output_dir.join(format!("{common_name}{extension}"))
        });

        Ok(ArtifactPaths {
            certificate: self.output_dir.join(format!("{common_name}_cert.pem")),
            private_key: self.output_dir.join(format!("{common_name}_key.pem")),
            rendered,
        })
    }

    /// Loads the template up front so a bad template fails before issuance.
    pub fn load_template(&self) -> Result<Option<String>, PkiError> {
        let Some(template) = &self.template else {
            return Ok(None);
        };
        let source = fs::read_to_string(template).map_err(|e| PkiError::Artifact {
            path: template.clone(),
            message: format!("cannot read template: {e}"),
        })?;
        // parse only; rendering happens once credentials exist
        Environment::new()
            .template_from_str(&source)
            .map_err(|e| PkiError::Artifact {
                path: template.clone(),
                message: format!("invalid template: {e}"),
            })?;
        Ok(Some(source))
    }

    pub fn write(
        &self,
        common_name: &str,
        credentials: &IssuedCredentials,
        template_source: Option<&str>,
    ) -> Result<ArtifactPaths, PkiError> {
        let paths = self.paths_for(common_name)?;

        write_file(&paths.certificate, credentials.certificate.as_bytes(), false)?;
        write_file(
            &paths.private_key,
            credentials.private_key.expose_secret().as_bytes(),
            true,
        )?;

        if let (Some(path), Some(source)) = (&paths.rendered, template_source) {
            let rendered = Environment::new()
                .render_str(
                    source,
                    context! {
                        cert => credentials.certificate.as_str(),
                        key => credentials.private_key.expose_secret().as_str(),
                        common_name => common_name,
                        serial => credentials.serial.as_str(),
                        issuing_ca => credentials.issuing_ca.as_deref(),
                    },
                )
                .map_err(|e| PkiError::Artifact {
                    path: path.clone(),
                    message: format!("template rendering failed: {e}"),
                })?;
            // rendered output usually embeds the key
            write_file(path, rendered.as_bytes(), true)?;
        }

        info!(
            "wrote {} and {}",
            paths.certificate.display(),
            paths.private_key.display()
        );
        Ok(paths)
    }
}

fn is_safe_file_stem(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

fn write_file(path: &Path, contents: &[u8], private: bool) -> Result<(), PkiError> {
    let artifact_err = |e: std::io::Error| PkiError::Artifact {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    restrict_to_owner(&mut options, private);

    let mut file = options.open(path).map_err(artifact_err)?;
    file.write_all(contents).map_err(artifact_err)
}

#[cfg(unix)]
fn restrict_to_owner(options: &mut OpenOptions, private: bool) {
    use std::os::unix::fs::OpenOptionsExt;
    if private {
        options.mode(0o600);
    }
}

#[cfg(not(unix))]
fn restrict_to_owner(_options: &mut OpenOptions, _private: bool) {}
