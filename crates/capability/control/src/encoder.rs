//! 动作 → 协议命令串。

use crate::ControlError;
use crate::action::ActionKind;
use domain::{OptionMap, OptionValue};

/// 冻结命令后固定追加的刷新命令。
pub const FREEZE_FOLLOW_UP: &str = "FPUPDATE\r";

const TERMINATOR: char = '\r';

/// 按动作名编码；未知动作名返回 [`ControlError::UnknownAction`]。
pub fn encode_action(name: &str, options: &OptionMap) -> Result<String, ControlError> {
    let kind: ActionKind = name.parse()?;
    encode(kind, options)
}

/// 编码一个动作，可能产生多条以 `\r` 结尾的命令。
pub fn encode(kind: ActionKind, options: &OptionMap) -> Result<String, ControlError> {
    let mut command = match kind {
        ActionKind::PipPosition => {
            let pip = required(kind, options, "p")?;
            let hpos = required(kind, options, "hpos")?;
            let vpos = required(kind, options, "vpos")?;
            format!(
                "PIPHPOS -p {pip} -o {hpos}{TERMINATOR}PIPVPOS -p {pip} -o {vpos}{TERMINATOR}"
            )
        }
        ActionKind::PipSize => {
            let pip = required(kind, options, "p")?;
            let hsize = required(kind, options, "hsize")?;
            let vsize = required(kind, options, "vsize")?;
            format!(
                "PIPHSIZE -p {pip} -w {hsize}{TERMINATOR}PIPVSIZE -p {pip} -h {vsize}{TERMINATOR}"
            )
        }
        ActionKind::BackgroundColor => {
            let red = required(kind, options, "r")?;
            let green = required(kind, options, "g")?;
            let blue = required(kind, options, "b")?;
            format!("RBACKGND -r {red} -g {green} -b {blue}{TERMINATOR}")
        }
        _ => default_command(kind.id(), options),
    };

    if kind == ActionKind::Freeze {
        command.push_str(FREEZE_FOLLOW_UP);
    }
    Ok(command)
}

/// 默认规则：`<ID>` + 每个非空选项 ` -<key> <value>` + `\r`。
fn default_command(id: &str, options: &OptionMap) -> String {
    let mut command = id.to_string();
    for (key, value) in options.iter().filter(|(_, value)| !value.is_blank()) {
        command.push_str(" -");
        command.push_str(key);
        command.push(' ');
        command.push_str(&value.to_string());
    }
    command.push(TERMINATOR);
    command
}

fn required<'a>(
    kind: ActionKind,
    options: &'a OptionMap,
    option: &'static str,
) -> Result<&'a OptionValue, ControlError> {
    options
        .get_filled(option)
        .ok_or(ControlError::MissingOption {
            action: kind.id(),
            option,
        })
}
