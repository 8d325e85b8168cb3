use super::*;
use crate::actions::control_targets;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use super::event_loop::KeyCommand;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn no_arguments_means_watch() {
    assert_eq!(parse_args(args(&[])), Ok(Command::Watch));
    assert_eq!(parse_args(args(&["watch"])), Ok(Command::Watch));
    assert_eq!(parse_args(args(&["once"])), Ok(Command::Once));
}

#[test]
fn set_collects_pairs_and_keeps_empty_values() {
    let cmd = parse_args(args(&[
        "set",
        "now_title=Song A",
        "now_art_uri=",
        "is_playing=true",
    ]));
    assert_eq!(
        cmd,
        Ok(Command::Set(vec![
            ("now_title".into(), "Song A".into()),
            ("now_art_uri".into(), String::new()),
            ("is_playing".into(), "true".into()),
        ]))
    );
}

#[test]
fn set_keeps_equals_signs_inside_values() {
    let cmd = parse_args(args(&["set", "now_art_uri=file:///a=b.png"]));
    assert_eq!(
        cmd,
        Ok(Command::Set(vec![("now_art_uri".into(), "file:///a=b.png".into())]))
    );
}

#[test]
fn bad_arguments_are_rejected() {
    assert!(parse_args(args(&["set"])).is_err());
    assert!(parse_args(args(&["set", "now_title"])).is_err());
    assert!(parse_args(args(&["play"])).is_err());
    assert!(parse_args(args(&["once", "extra"])).is_err());
    assert!(parse_args(args(&["--help"])).is_err());
}

#[test]
fn keys_map_to_commands() {
    let key = |c| KeyEvent::new(c, KeyModifiers::NONE);
    assert_eq!(KeyCommand::from_key(key(KeyCode::Char(' '))), Some(KeyCommand::Toggle));
    assert_eq!(KeyCommand::from_key(key(KeyCode::Char('p'))), Some(KeyCommand::Toggle));
    assert_eq!(KeyCommand::from_key(key(KeyCode::Char('l'))), Some(KeyCommand::Next));
    assert_eq!(KeyCommand::from_key(key(KeyCode::Char('h'))), Some(KeyCommand::Previous));
    assert_eq!(KeyCommand::from_key(key(KeyCode::Enter)), Some(KeyCommand::OpenApp));
    assert_eq!(KeyCommand::from_key(key(KeyCode::Char('r'))), Some(KeyCommand::Refresh));
    assert_eq!(KeyCommand::from_key(key(KeyCode::Char('q'))), Some(KeyCommand::Quit));
    assert_eq!(
        KeyCommand::from_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        Some(KeyCommand::Quit)
    );
    assert_eq!(KeyCommand::from_key(key(KeyCode::Char('x'))), None);
}

#[test]
fn commands_fire_matching_widget_actions() {
    let targets = control_targets(&["player".to_string()]);
    let code = |cmd: KeyCommand| cmd.target(&targets).map(|a| a.request_code);
    assert_eq!(code(KeyCommand::Toggle), Some(85));
    assert_eq!(code(KeyCommand::Next), Some(87));
    assert_eq!(code(KeyCommand::Previous), Some(88));
    assert_eq!(code(KeyCommand::OpenApp), Some(1001));
    assert_eq!(code(KeyCommand::Refresh), None);
    assert_eq!(code(KeyCommand::Quit), None);
}
