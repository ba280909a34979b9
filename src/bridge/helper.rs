use std::process::Command;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::device::{ServiceDescriptor, ServiceGroupDescriptor};

use super::{DeviceReport, DoctorReport};

const DEFAULT_HELPER: &str = "hkbridge";

/// Bridge backed by the companion `hkbridge` CLI, which owns the actual
/// HomeKit session. Each call shells out; the helper answers synchronously.
pub struct HelperBridge {
    command: String,
}

#[derive(Debug, Deserialize)]
struct HelperListing {
    #[serde(default)]
    groups: Vec<ServiceGroupDescriptor>,
    #[serde(default)]
    services: Vec<ServiceDescriptor>,
}

impl HelperBridge {
    pub fn new(command: Option<String>) -> Self {
        Self {
            command: command.unwrap_or_else(|| DEFAULT_HELPER.to_string()),
        }
    }

    fn ensure_helper_present(&self) -> Result<()> {
        let status = Command::new("sh")
            .arg("-lc")
            .arg(format!(
                "command -v {} >/dev/null 2>&1",
                shell_quote(&self.command)
            ))
            .status()
            .with_context(|| format!("checking for {} in PATH", self.command))?;
        if !status.success() {
            bail!(
                "Missing dependency: `{}`.\nInstall the HomeBar helper and make sure it is on PATH.",
                self.command
            );
        }
        Ok(())
    }

    fn run_helper(&self, args: &[&str]) -> Result<String> {
        self.ensure_helper_present()?;
        let out = Command::new(&self.command)
            .args(args)
            .output()
            .with_context(|| format!("running {} {}", self.command, args.join(" ")))?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            let stdout = String::from_utf8_lossy(&out.stdout);
            bail!(
                "{} failed (exit={}):\nstdout:\n{}\nstderr:\n{}",
                self.command,
                out.status,
                stdout.trim(),
                stderr.trim()
            );
        }
        String::from_utf8(out.stdout)
            .with_context(|| format!("{} output was not UTF-8", self.command))
    }

    /// Fallible power operations for callers that surface errors (the CLI).
    /// The `PowerBridge` trait impl wraps these with the best-effort policy
    /// the menu relies on.
    pub fn toggle(&self, id: Uuid) -> Result<()> {
        self.run_helper(&["toggle", &id.to_string()])?;
        Ok(())
    }

    pub fn read_state(&self, id: Uuid) -> Result<bool> {
        let out = self.run_helper(&["get", &id.to_string()])?;
        parse_state(&out)
    }

    pub fn write_state(&self, id: Uuid, on: bool) -> Result<()> {
        let value = if on { "1" } else { "0" };
        self.run_helper(&["set", &id.to_string(), value])?;
        Ok(())
    }
}

impl super::DeviceSource for HelperBridge {
    fn devices(&self) -> Result<DeviceReport> {
        let raw = self.run_helper(&["list"])?;
        let listing = parse_listing(&raw)?;

        Ok(DeviceReport {
            groups: listing.groups,
            services: listing.services,
            raw: Some(raw),
        })
    }

    fn doctor(&self) -> Result<DoctorReport> {
        let mut messages = Vec::new();

        if let Err(e) = self.ensure_helper_present() {
            messages.push(e.to_string());
            return Ok(DoctorReport {
                ok: false,
                message: messages.join("\n"),
            });
        }

        match self.run_helper(&["list"]).and_then(|raw| {
            let listing = parse_listing(&raw)?;
            Ok((listing.groups.len(), listing.services.len()))
        }) {
            Ok((groups, services)) => {
                messages.push(format!("{}: OK", self.command));
                messages.push(format!(
                    "Reported {groups} group(s) and {services} service(s)."
                ));
                Ok(DoctorReport {
                    ok: true,
                    message: messages.join("\n\n"),
                })
            }
            Err(e) => Ok(DoctorReport {
                ok: false,
                message: format!("{} failed to list devices: {e}", self.command),
            }),
        }
    }
}

impl super::PowerBridge for HelperBridge {
    fn toggle_power(&self, id: Uuid) {
        if let Err(e) = self.toggle(id) {
            warn!(%id, "toggle failed: {e:#}");
        }
    }

    fn power_state(&self, id: Uuid) -> Option<bool> {
        match self.read_state(id) {
            Ok(on) => Some(on),
            Err(e) => {
                warn!(%id, "state read failed: {e:#}");
                None
            }
        }
    }

    fn set_power(&self, id: Uuid, on: bool) {
        if let Err(e) = self.write_state(id, on) {
            warn!(%id, on, "state write failed: {e:#}");
        }
    }
}

fn parse_listing(raw: &str) -> Result<HelperListing> {
    serde_json::from_str(raw).context("parsing helper device listing")
}

/// The helper prints the power state as a bare integer (0 = off).
fn parse_state(out: &str) -> Result<bool> {
    let trimmed = out.trim();
    let n: i64 = trimmed
        .parse()
        .map_err(|_| anyhow!("unexpected state output: {trimmed:?}"))?;
    Ok(n != 0)
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r#"'\''"#))
}
