use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;
use uuid::Uuid;

use crate::bridge::{self, Bridge};
use crate::config::{self, Config};
use crate::menu::commands::{
    Command, CMD_BASE_ITEM, CMD_EDIT_CONFIG, CMD_QUIT, CMD_REFRESH, CMD_RELOAD,
};
use crate::menu::item::{Glyph, ToggleMenuItem};
use crate::menu::spec::{MenuItem, MenuSpec};

pub struct TrayModel {
    items: Vec<ToggleMenuItem>,
    bridge: Box<dyn Bridge>,
    last_error: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ModelUpdate {
    pub refresh_menu: bool,
    pub refresh_tooltip: bool,
    pub quit: bool,
    pub open_path: Option<PathBuf>,
}

impl TrayModel {
    pub fn new() -> Result<Self> {
        let (config, config_error) = load_config();
        let bridge = bridge::from_config(config.as_ref()).context("select bridge")?;
        let (items, list_error) = build_items(&*bridge, config.as_ref());

        Ok(Self {
            items,
            bridge,
            last_error: config_error.or(list_error),
        })
    }

    pub fn items(&self) -> &[ToggleMenuItem] {
        &self.items
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Records a failure raised outside the model (e.g. by the platform
    /// glue) so the tooltip can surface it.
    pub fn note_failure(&mut self, msg: String) {
        self.last_error = Some(msg);
    }

    pub fn menu_spec(&self) -> MenuSpec {
        let mut items = Vec::new();
        items.push(MenuItem::Header("Devices".to_string()));

        for (index, item) in self.items.iter().enumerate() {
            items.push(MenuItem::Action {
                id: CMD_BASE_ITEM + index as u16,
                title: item.title().to_string(),
                checked: item.state().is_checked(),
                enabled: true,
                symbol: Some(item.glyph().symbol_name()),
            });
        }

        items.push(MenuItem::Separator);
        items.push(MenuItem::Header("Actions".to_string()));
        items.push(MenuItem::Action {
            id: CMD_REFRESH,
            title: "Refresh".to_string(),
            checked: false,
            enabled: true,
            symbol: None,
        });
        items.push(MenuItem::Action {
            id: CMD_RELOAD,
            title: "Reload devices".to_string(),
            checked: false,
            enabled: true,
            symbol: None,
        });
        items.push(MenuItem::Action {
            id: CMD_EDIT_CONFIG,
            title: "Edit config".to_string(),
            checked: false,
            enabled: true,
            symbol: None,
        });
        items.push(MenuItem::Action {
            id: CMD_QUIT,
            title: "Quit".to_string(),
            checked: false,
            enabled: true,
            symbol: None,
        });

        MenuSpec::new(items)
    }

    pub fn handle(&mut self, cmd: Command) -> ModelUpdate {
        match cmd {
            Command::Item(index) => {
                if let Some(item) = self.items.get_mut(index) {
                    debug!(title = item.title(), "row clicked");
                    item.toggle(self.bridge.as_ref());
                }
                ModelUpdate {
                    refresh_menu: true,
                    ..Default::default()
                }
            }
            Command::Refresh => {
                self.refresh_states();
                ModelUpdate {
                    refresh_menu: true,
                    ..Default::default()
                }
            }
            Command::Reload => self.reload(),
            Command::EditConfig => self
                .edit_config()
                .map(|path| ModelUpdate {
                    open_path: Some(path),
                    ..Default::default()
                })
                .unwrap_or_else(|err| self.note_error(err)),
            Command::Quit => ModelUpdate {
                quit: true,
                ..Default::default()
            },
        }
    }

    /// Re-reads every row's state from the bridge. The update argument is a
    /// pure change signal and carries no information of its own.
    pub fn refresh_states(&mut self) {
        for item in &mut self.items {
            item.update(0, self.bridge.as_ref());
        }
    }

    /// Routes a pushed characteristic change to the rows bound to it.
    pub fn apply_update(&mut self, id: Uuid, value: i64) -> bool {
        let mut routed = false;
        for item in &mut self.items {
            if item.binds(id) {
                item.update(value, self.bridge.as_ref());
                routed = true;
            }
        }
        routed
    }

    fn reload(&mut self) -> ModelUpdate {
        let (config, config_error) = load_config();
        let (items, list_error) = build_items(&*self.bridge, config.as_ref());
        self.items = items;
        self.last_error = config_error.or(list_error);

        ModelUpdate {
            refresh_menu: true,
            refresh_tooltip: true,
            ..Default::default()
        }
    }

    fn edit_config(&mut self) -> Result<PathBuf> {
        let path = config::ensure_config_file_exists().context("ensure config exists")?;
        Ok(path)
    }

    fn note_error(&mut self, err: anyhow::Error) -> ModelUpdate {
        self.last_error = Some(err.to_string());
        ModelUpdate {
            refresh_tooltip: true,
            ..Default::default()
        }
    }
}

fn load_config() -> (Option<Config>, Option<String>) {
    match config::load_optional() {
        Ok(cfg) => (cfg, None),
        Err(e) => (None, Some(e.to_string())),
    }
}

/// Builds the menu rows: one per group, then one per single device, skipping
/// hidden names and anything without a power-state characteristic.
pub fn build_items(
    bridge: &dyn Bridge,
    config: Option<&Config>,
) -> (Vec<ToggleMenuItem>, Option<String>) {
    let report = match bridge.devices() {
        Ok(report) => report,
        Err(e) => return (Vec::new(), Some(e.to_string())),
    };

    let hidden = |name: &str| config.map(|c| c.is_hidden(name)).unwrap_or(false);
    let mut items = Vec::new();

    for group in &report.groups {
        if hidden(&group.name) {
            continue;
        }
        if let Some(item) = ToggleMenuItem::from_group(group, Glyph::LightBulb) {
            items.push(item);
        }
    }

    for service in &report.services {
        if hidden(&service.name) {
            continue;
        }
        if let Some(item) = ToggleMenuItem::from_service(service, Glyph::for_service(service.kind))
        {
            items.push(item);
        }
    }

    (items, None)
}
