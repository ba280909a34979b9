use std::{
    ffi::c_void,
    fs::OpenOptions,
    io::Write,
    os::fd::AsRawFd,
    path::Path,
    process::Command,
    sync::Once,
};

use anyhow::{anyhow, Context, Result};
use cocoa::{
    appkit::{NSApp, NSApplication, NSApplicationActivationPolicyAccessory, NSStatusBar},
    base::{id, nil},
    foundation::{NSAutoreleasePool, NSInteger, NSString},
};
use objc::{
    class,
    declare::ClassDecl,
    msg_send,
    runtime::{Class, Object, Sel},
    sel, sel_impl,
};

use crate::menu::commands;
use crate::menu::model::TrayModel;
use crate::menu::spec::MenuItem;

const APP_NAME: &str = "HomeBar";

const MENU_STATE_OFF: NSInteger = 0;
const MENU_STATE_ON: NSInteger = 1;

pub fn run() -> Result<()> {
    unsafe {
        // If the user launches the binary from a terminal (e.g. `cargo run --bin homebartray`),
        // closing that terminal will typically send SIGHUP and kill the app. Ignore SIGHUP and
        // redirect stdout/stderr to avoid being tied to the tty.
        detach_from_terminal();

        let _pool = NSAutoreleasePool::new(nil);

        let app = NSApp();
        app.setActivationPolicy_(NSApplicationActivationPolicyAccessory);

        let mut state = Box::new(State::new()?);
        let state_ptr: *mut State = &mut *state;

        let target = new_target(state_ptr);
        state
            .install_status_item(target)
            .context("install status item")?;

        app.run();
        drop(state);
    }

    Ok(())
}

const OUT_LOG: &str = "/tmp/homebartray.out";
const ERR_LOG: &str = "/tmp/homebartray.err";

fn append_log(path: &str) -> Option<std::fs::File> {
    OpenOptions::new().create(true).append(true).open(path).ok()
}

fn detach_from_terminal() {
    unsafe {
        // Ignore SIGHUP (terminal close).
        libc::signal(libc::SIGHUP, libc::SIG_IGN);

        // If we're attached to a tty, redirect stdout/stderr to files.
        // This keeps the process alive even if the tty goes away.
        let stdout_is_tty = libc::isatty(libc::STDOUT_FILENO) == 1;
        let stderr_is_tty = libc::isatty(libc::STDERR_FILENO) == 1;
        if !stdout_is_tty && !stderr_is_tty {
            return;
        }

        if let Some(f) = append_log(OUT_LOG) {
            let _ = libc::dup2(f.as_raw_fd(), libc::STDOUT_FILENO);
        }

        if let Some(f) = append_log(ERR_LOG) {
            let _ = libc::dup2(f.as_raw_fd(), libc::STDERR_FILENO);
        }
    }
}

struct State {
    status_item: Option<id>,
    menu: Option<id>,
    model: TrayModel,
}

impl State {
    fn new() -> Result<Self> {
        let model = TrayModel::new().context("build tray model")?;
        Ok(Self {
            status_item: None,
            menu: None,
            model,
        })
    }

    fn install_status_item(&mut self, target: id) -> Result<()> {
        unsafe {
            let status_item: id =
                msg_send![NSStatusBar::systemStatusBar(nil), statusItemWithLength: -1.0];
            let button: id = msg_send![status_item, button];
            let title = nsstring(APP_NAME);
            let _: () = msg_send![button, setTitle: title];

            self.status_item = Some(status_item);
            self.rebuild_menu(target).context("build menu")?;
            self.update_tooltip();
        }

        Ok(())
    }

    fn rebuild_menu(&mut self, target: id) -> Result<()> {
        unsafe {
            let menu: id = msg_send![class!(NSMenu), alloc];
            let menu: id = msg_send![menu, initWithTitle: nsstring(APP_NAME)];

            for entry in self.model.menu_spec().items {
                match entry {
                    MenuItem::Header(title) => add_header(menu, &title),
                    MenuItem::Separator => {
                        let sep: id = msg_send![class!(NSMenuItem), separatorItem];
                        let _: () = msg_send![menu, addItem: sep];
                    }
                    MenuItem::Action {
                        id: cmd,
                        title,
                        checked,
                        enabled,
                        symbol,
                    } => {
                        add_action_item(
                            menu,
                            &title,
                            sel!(onMenuItem:),
                            target,
                            cmd as NSInteger,
                            checked,
                            enabled,
                            symbol,
                        );
                    }
                }
            }

            if let Some(status_item) = self.status_item {
                let _: () = msg_send![status_item, setMenu: menu];
            }

            self.menu = Some(menu);
        }
        Ok(())
    }

    fn update_tooltip(&mut self) {
        unsafe {
            let status_item = match self.status_item {
                Some(s) => s,
                None => return,
            };
            let button: id = msg_send![status_item, button];
            let tip = match self.model.last_error() {
                None => APP_NAME,
                Some(e) => e,
            };
            let tip = nsstring(tip);
            let _: () = msg_send![button, setToolTip: tip];
        }
    }

    fn handle_cmd(&mut self, cmd_id: u16, target: id) -> Result<()> {
        let Some(cmd) = commands::decode(cmd_id, self.model.items().len()) else {
            return Ok(());
        };

        let update = self.model.handle(cmd);

        if update.quit {
            unsafe {
                let app = NSApp();
                let _: () = msg_send![app, terminate: nil];
            }
            return Ok(());
        }

        if let Some(path) = update.open_path.as_deref() {
            shell_open(path).with_context(|| format!("open {}", path.display()))?;
        }
        if update.refresh_menu {
            self.rebuild_menu(target)?;
        }
        if update.refresh_tooltip {
            self.update_tooltip();
        }

        Ok(())
    }
}

fn shell_open(path: &Path) -> Result<()> {
    let status = Command::new("open")
        .arg(path)
        .status()
        .with_context(|| format!("running open {}", path.display()))?;
    if !status.success() {
        return Err(anyhow!("open failed (exit={status})"));
    }
    Ok(())
}

unsafe fn nsstring(s: &str) -> id {
    NSString::alloc(nil).init_str(s)
}

unsafe fn add_header(menu: id, title: &str) {
    let item: id = msg_send![class!(NSMenuItem), alloc];
    let title = nsstring(title);
    let empty = nsstring("");
    let item: id =
        msg_send![item, initWithTitle: title action: sel!(onMenuItem:) keyEquivalent: empty];
    let _: () = msg_send![item, setEnabled: false];
    let _: () = msg_send![menu, addItem: item];
}

#[allow(clippy::too_many_arguments)]
unsafe fn add_action_item(
    menu: id,
    title: &str,
    action: Sel,
    target: id,
    tag: NSInteger,
    checked: bool,
    enabled: bool,
    symbol: Option<&str>,
) {
    let item: id = msg_send![class!(NSMenuItem), alloc];
    let title = nsstring(title);
    let empty = nsstring("");
    let item: id = msg_send![item, initWithTitle: title action: action keyEquivalent: empty];
    let _: () = msg_send![item, setTarget: target];
    let _: () = msg_send![item, setTag: tag];
    let _: () = msg_send![item, setEnabled: enabled];

    let state = if checked { MENU_STATE_ON } else { MENU_STATE_OFF };
    let _: () = msg_send![item, setState: state];

    if let Some(name) = symbol {
        let name = nsstring(name);
        let image: id =
            msg_send![class!(NSImage), imageWithSystemSymbolName: name accessibilityDescription: nil];
        if image != nil {
            let _: () = msg_send![item, setImage: image];
        }
    }

    let _: () = msg_send![menu, addItem: item];
}

fn target_class() -> *const Class {
    static ONCE: Once = Once::new();
    static mut CLS: *const Class = std::ptr::null();

    ONCE.call_once(|| unsafe {
        let ns_object = class!(NSObject);
        let mut decl = ClassDecl::new("HomeBarTarget", ns_object)
            .expect("HomeBarTarget class already registered");
        decl.add_ivar::<*mut c_void>("state_ptr");
        decl.add_method(
            sel!(onMenuItem:),
            on_menu_item as extern "C" fn(&Object, Sel, id),
        );
        CLS = decl.register();
    });

    unsafe { CLS }
}

fn new_target(state_ptr: *mut State) -> id {
    unsafe {
        let cls = target_class();
        let obj: id = msg_send![cls, new];
        (*obj).set_ivar("state_ptr", state_ptr as *mut c_void);
        obj
    }
}

extern "C" fn on_menu_item(this: &Object, _cmd: Sel, sender: id) {
    unsafe {
        let state_ptr: *mut c_void = *this.get_ivar("state_ptr");
        if state_ptr.is_null() {
            return;
        }
        let state = &mut *(state_ptr as *mut State);
        let tag: NSInteger = msg_send![sender, tag];
        let cmd = tag as u16;

        if let Err(e) = state.handle_cmd(cmd, this as *const _ as id) {
            let msg = format!("{e:#}");
            log_to_tmp("homebartray error", &msg);
            state.model.note_failure(msg);
            state.update_tooltip();
        }
    }
}

fn log_to_tmp(prefix: &str, msg: &str) {
    if let Some(mut f) = append_log(ERR_LOG) {
        let _ = writeln!(f, "{prefix}: {msg}");
    }
}
