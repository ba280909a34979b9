pub const CMD_BASE_ITEM: u16 = 2000;
pub const CMD_REFRESH: u16 = 5000;
pub const CMD_RELOAD: u16 = 5001;
pub const CMD_EDIT_CONFIG: u16 = 5002;
pub const CMD_QUIT: u16 = 5003;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Click on a device/group row, by row index.
    Item(usize),
    Refresh,
    Reload,
    EditConfig,
    Quit,
}

pub fn decode(cmd_id: u16, item_count: usize) -> Option<Command> {
    match cmd_id {
        CMD_REFRESH => return Some(Command::Refresh),
        CMD_RELOAD => return Some(Command::Reload),
        CMD_EDIT_CONFIG => return Some(Command::EditConfig),
        CMD_QUIT => return Some(Command::Quit),
        _ => {}
    }

    if cmd_id >= CMD_BASE_ITEM {
        let index = (cmd_id - CMD_BASE_ITEM) as usize;
        if index < item_count {
            return Some(Command::Item(index));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_item_rows_within_bounds() {
        assert_eq!(decode(CMD_BASE_ITEM, 3), Some(Command::Item(0)));
        assert_eq!(decode(CMD_BASE_ITEM + 2, 3), Some(Command::Item(2)));
        assert_eq!(decode(CMD_BASE_ITEM + 3, 3), None);
        assert_eq!(decode(CMD_BASE_ITEM, 0), None);
    }

    #[test]
    fn decodes_fixed_actions() {
        assert_eq!(decode(CMD_REFRESH, 0), Some(Command::Refresh));
        assert_eq!(decode(CMD_RELOAD, 0), Some(Command::Reload));
        assert_eq!(decode(CMD_EDIT_CONFIG, 0), Some(Command::EditConfig));
        assert_eq!(decode(CMD_QUIT, 0), Some(Command::Quit));
        assert_eq!(decode(123, 0), None);
    }
}
