/*
    Farm job specification.

    A compiled job is one `<spec>` document: accounting fields, then a single
    `<job>` with its ordered `<layers>`. Each layer carries a command template
    whose frame tokens are substituted by the farm per task, never here.
    Compilation is deterministic so output can be compared byte for byte.
*/
use crate::command::RenderCommand;
use crate::config::{FarmConfig, NodeOs};
use crate::error::CompileError;
use crate::models::{
    job_request::JobRequest,
    layer::{LayerKind, LayerSpec, Renderer, ResourceTier},
};
use crate::path_translator::PathTranslator;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Write as _};

const DOCTYPE: &str = r#"<!DOCTYPE spec PUBLIC "SPI Cue Specification Language" "http://localhost:8080/spcue/dtd/cjsl-1.12.dtd">"#;
const LAYER_TYPE: &str = "Render";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerNode {
    pub name: String,
    pub layer_type: String,
    pub command: String,
    /// `"<start>-<end>"`
    pub range: String,
    pub chunk: u32,
    pub cores: Option<u32>,
    pub memory_mb: Option<u64>,
    pub env: BTreeMap<String, String>,
    pub services: Vec<ResourceTier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobNode {
    pub name: String,
    pub paused: bool,
    pub priority: Option<u32>,
    pub os: NodeOs,
    pub layers: Vec<LayerNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub facility: String,
    pub show: String,
    pub shot: String,
    pub user: String,
    pub uid: u32,
    pub job: JobNode,
}

fn escape_with(text: &str, quotes: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape(text: &str) -> String {
    escape_with(text, false)
}

fn escape_attr(text: &str) -> String {
    escape_with(text, true)
}

// writing into a String cannot fail, so the fmt::Result values below are ignored
impl JobSpec {
    /// Render the document the farm's launch call accepts.
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\"?>\n");
        xml.push_str(DOCTYPE);
        xml.push('\n');
        xml.push_str("<spec>\n");
        let _ = writeln!(xml, "  <facility>{}</facility>", escape(&self.facility));
        let _ = writeln!(xml, "  <show>{}</show>", escape(&self.show));
        let _ = writeln!(xml, "  <shot>{}</shot>", escape(&self.shot));
        let _ = writeln!(xml, "  <user>{}</user>", escape(&self.user));
        let _ = writeln!(xml, "  <uid>{}</uid>", self.uid);

        let job = &self.job;
        let _ = writeln!(xml, "  <job name=\"{}\">", escape_attr(&job.name));
        let paused = if job.paused { "True" } else { "False" };
        let _ = writeln!(xml, "    <paused>{paused}</paused>");
        if let Some(priority) = job.priority {
            let _ = writeln!(xml, "    <priority>{priority}</priority>");
        }
        let _ = writeln!(xml, "    <os>{}</os>", job.os);
        xml.push_str("    <layers>\n");
        for layer in &job.layers {
            layer.write_xml(&mut xml);
        }
        xml.push_str("    </layers>\n");
        xml.push_str("  </job>\n");
        xml.push_str("</spec>");
        xml
    }
}

impl LayerNode {
    fn write_xml(&self, xml: &mut String) {
        let _ = writeln!(
            xml,
            "      <layer name=\"{}\" type=\"{}\">",
            escape_attr(&self.name),
            escape_attr(&self.layer_type)
        );
        let _ = writeln!(xml, "        <cmd>{}</cmd>", escape(&self.command));
        let _ = writeln!(xml, "        <range>{}</range>", escape(&self.range));
        let _ = writeln!(xml, "        <chunk>{}</chunk>", self.chunk);
        if let Some(cores) = self.cores {
            let _ = writeln!(xml, "        <cores>{cores}</cores>");
        }
        if let Some(memory) = self.memory_mb {
            let _ = writeln!(xml, "        <memory>{memory}m</memory>");
        }
        if !self.env.is_empty() {
            xml.push_str("        <env>\n");
            for (key, value) in &self.env {
                let _ = writeln!(
                    xml,
                    "          <key name=\"{}\">{}</key>",
                    escape_attr(key),
                    escape(value)
                );
            }
            xml.push_str("        </env>\n");
        }
        xml.push_str("        <services>\n");
        for service in &self.services {
            let _ = writeln!(xml, "          <service>{}</service>", escape(service.as_str()));
        }
        xml.push_str("        </services>\n");
        xml.push_str("      </layer>\n");
    }
}

/// Turns a [`JobRequest`] into a [`JobSpec`] using one configuration.
#[derive(Debug, Clone)]
pub struct Compiler<'a> {
    config: &'a FarmConfig,
    translator: PathTranslator,
}

impl<'a> Compiler<'a> {
    pub fn new(config: &'a FarmConfig) -> Self {
        Self {
            config,
            translator: PathTranslator::new(config.path_rule.clone()),
        }
    }

    pub fn translator(&self) -> &PathTranslator {
        &self.translator
    }

    pub fn compile(&self, request: &JobRequest) -> Result<JobSpec, CompileError> {
        if request.layers.is_empty() {
            return Err(CompileError::NoLayers(request.name.clone()));
        }

        let layers = request
            .layers
            .iter()
            .map(|layer| self.compile_layer(layer))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(JobSpec {
            facility: self.config.facility.clone(),
            show: request.show.clone(),
            shot: request.shot.clone(),
            user: request.username.clone(),
            uid: self.config.uid,
            job: JobNode {
                name: request.name.clone(),
                paused: false,
                priority: request.priority,
                os: self.config.node_os,
                layers,
            },
        })
    }

    /// Command line for one layer, with every workstation path already rewritten.
    pub fn layer_command(&self, layer: &LayerSpec) -> Result<String, CompileError> {
        match &layer.kind {
            LayerKind::Maya { renderer, camera } => self.maya_command(layer, renderer, camera),
            LayerKind::Shell { command } => Ok(self.shell_command(command)),
            LayerKind::Unsupported => Err(CompileError::UnsupportedLayerType {
                layer: layer.name.clone(),
                layer_type: layer.kind.type_name().to_owned(),
            }),
        }
    }

    fn maya_command(
        &self,
        layer: &LayerSpec,
        renderer: &Renderer,
        camera: &str,
    ) -> Result<String, CompileError> {
        let target = self.translator.translate(&layer.target);
        RenderCommand::new(
            self.config.render_executable.as_str(),
            renderer.clone(),
            camera,
            target,
            self.config.frame_start_token.as_str(),
            self.config.frame_end_token.as_str(),
        )
        .build()
        .map_err(|source| CompileError::Command {
            layer: layer.name.clone(),
            source,
        })
    }

    fn shell_command(&self, command: &str) -> String {
        self.translator.translate_command(command)
    }

    fn compile_layer(&self, layer: &LayerSpec) -> Result<LayerNode, CompileError> {
        let command = self.layer_command(layer)?;
        if self.translator.contains_local_path(&command) {
            return Err(CompileError::UntranslatedPath(layer.name.clone()));
        }

        let services = if layer.services.is_empty() {
            tracing::debug!(
                "Layer {} names no resource tier, using {}",
                layer.name,
                self.config.default_service
            );
            vec![ResourceTier::new(self.config.default_service.as_str())]
        } else {
            layer.services.clone()
        };
        if services.iter().any(ResourceTier::is_empty) {
            return Err(CompileError::EmptyResourceTier(layer.name.clone()));
        }

        Ok(LayerNode {
            name: layer.name.clone(),
            layer_type: LAYER_TYPE.to_owned(),
            command,
            range: layer.range.to_string(),
            chunk: layer.chunk,
            cores: layer.min_cores,
            memory_mb: layer.min_memory_mb,
            env: layer
                .env
                .iter()
                .map(|(key, value)| (key.clone(), self.translator.translate(value)))
                .collect(),
            services,
        })
    }
}

/// Compile with a throwaway [`Compiler`].
pub fn compile(request: &JobRequest, config: &FarmConfig) -> Result<JobSpec, CompileError> {
    Compiler::new(config).compile(request)
}
