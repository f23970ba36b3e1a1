//! Focus traversal through the Screen Engine.

mod common;

use common::{Probe, headless};
use pretty_assertions::assert_eq;
use spark_screen::{FocusInfo, KeyCode, KeyEvent, Modifiers, Region, Screen};

fn row(y: u16) -> Region {
    Region::new(0, y, 20, 1)
}

fn register_tab_indices(screen: &mut Screen<Vec<u8>>, indices: &[i32]) {
    for (i, &tab_index) in indices.iter().enumerate() {
        let probe = Probe::focusable(&format!("c{tab_index}"))
            .with_focus(FocusInfo::focusable().with_tab_index(tab_index))
            .shared();
        screen
            .register_component(&format!("tab{tab_index}"), probe, row(i as u16))
            .unwrap();
    }
}

fn visit(screen: &mut Screen<Vec<u8>>, steps: usize) -> Vec<String> {
    (0..steps)
        .map(|_| {
            screen.focus_next().unwrap();
            screen.focused_id().unwrap_or_default().to_string()
        })
        .collect()
}

#[test]
fn focus_next_follows_tab_index_not_registration_order() {
    let mut screen = headless(20, 5);
    register_tab_indices(&mut screen, &[2, 0, 1]);
    // The first focusable registration took focus.
    assert_eq!(screen.focused_id(), Some("tab2"));

    screen.blur().unwrap();
    assert_eq!(visit(&mut screen, 4), vec!["tab0", "tab1", "tab2", "tab0"]);
}

#[test]
fn focus_previous_wraps_backwards() {
    let mut screen = headless(20, 5);
    register_tab_indices(&mut screen, &[0, 1, 2]);
    screen.blur().unwrap();

    screen.focus_previous().unwrap();
    assert_eq!(screen.focused_id(), Some("tab2"));
    screen.focus_previous().unwrap();
    assert_eq!(screen.focused_id(), Some("tab1"));
}

#[test]
fn tab_and_shift_tab_are_global_bindings() {
    let mut screen = headless(20, 5);
    register_tab_indices(&mut screen, &[0, 1]);

    screen.handle_input_bytes(b"\t").unwrap();
    assert_eq!(screen.focused_id(), Some("tab1"));
    screen.handle_input_bytes(b"\x1b[Z").unwrap();
    assert_eq!(screen.focused_id(), Some("tab0"));
    screen.handle_key(KeyEvent::new(KeyCode::Tab, Modifiers::SHIFT)).unwrap();
    assert_eq!(screen.focused_id(), Some("tab1"));
}

#[test]
fn disabled_and_hidden_components_are_skipped() {
    // Every placement of one disabled and one hidden component among five.
    for disabled in 0..5usize {
        for hidden in 0..5usize {
            if disabled == hidden {
                continue;
            }
            let mut screen = headless(20, 6);
            for i in 0..5usize {
                let info = FocusInfo::focusable()
                    .with_disabled(i == disabled)
                    .with_visible(i != hidden);
                screen
                    .register_component(&format!("c{i}"), Probe::label("x").with_focus(info).shared(), row(i as u16))
                    .unwrap();
            }

            let visited = visit(&mut screen, 10);
            let skipped = [format!("c{disabled}"), format!("c{hidden}")];
            assert!(
                visited.iter().all(|id| !skipped.contains(id)),
                "disabled={disabled} hidden={hidden} visited={visited:?}"
            );
            // Three candidates remain and all of them get visited.
            let mut distinct = visited.clone();
            distinct.sort();
            distinct.dedup();
            assert_eq!(distinct.len(), 3);
        }
    }
}

#[test]
fn negative_tab_index_opts_out() {
    let mut screen = headless(20, 3);
    screen
        .register_component("in", Probe::focusable("in").shared(), row(0))
        .unwrap();
    screen
        .register_component(
            "out",
            Probe::label("out").with_focus(FocusInfo::focusable().with_tab_index(-1)).shared(),
            row(1),
        )
        .unwrap();
    assert_eq!(visit(&mut screen, 3), vec!["in", "in", "in"]);
    assert!(!screen.focus("out").unwrap());
}

#[test]
fn no_candidates_leaves_focus_empty() {
    let mut screen = headless(20, 3);
    screen.register_component("label", Probe::label("l").shared(), row(0)).unwrap();
    assert!(!screen.focus_next().unwrap());
    assert!(!screen.focus_previous().unwrap());
    assert_eq!(screen.focused_id(), None);
}

#[test]
fn focus_trap_confines_traversal() {
    let mut screen = headless(40, 10);
    screen.register_component("page", Probe::focusable("page").shared(), Region::new(0, 0, 40, 10)).unwrap();
    screen.register_component("dialog", Probe::label("dialog").shared(), Region::new(10, 2, 20, 6)).unwrap();
    screen.register_component("ok", Probe::focusable("ok").shared(), Region::new(12, 6, 4, 1)).unwrap();
    screen.register_component("cancel", Probe::focusable("cancel").shared(), Region::new(18, 6, 8, 1)).unwrap();

    screen.push_focus_trap("dialog");
    assert_eq!(visit(&mut screen, 3), vec!["ok", "cancel", "ok"]);

    assert_eq!(screen.pop_focus_trap().as_deref(), Some("dialog"));
    assert_eq!(visit(&mut screen, 2), vec!["cancel", "page"]);
}

#[test]
fn restore_previous_focus_returns_to_prior_holder() {
    let mut screen = headless(20, 5);
    register_tab_indices(&mut screen, &[0, 1, 2]);
    assert!(screen.focus("tab2").unwrap());
    assert_eq!(screen.focus_history(), vec!["tab0", "tab2"]);

    assert!(screen.restore_previous_focus().unwrap());
    assert_eq!(screen.focused_id(), Some("tab0"));
}

#[test]
fn focus_hooks_fire_on_transitions() {
    let mut screen = headless(20, 3);
    let a = Probe::focusable("a").shared();
    let b = Probe::focusable("b").shared();
    screen.register_component("a", a.clone(), row(0)).unwrap();
    screen.register_component("b", b.clone(), row(1)).unwrap();

    screen.focus_next().unwrap();
    screen.focus_next().unwrap();
    assert_eq!((a.borrow().focus_calls, a.borrow().blur_calls), (2, 1));
    assert_eq!((b.borrow().focus_calls, b.borrow().blur_calls), (1, 1));

    // Focusing the holder again is a no-op.
    assert!(screen.focus("a").unwrap());
    assert_eq!(a.borrow().focus_calls, 2);
}

#[test]
fn unregistering_focused_component_blurs_it() {
    let mut screen = headless(20, 3);
    let a = Probe::focusable("a").shared();
    screen.register_component("a", a.clone(), row(0)).unwrap();
    screen.register_component("b", Probe::focusable("b").shared(), row(1)).unwrap();

    assert!(screen.unregister("a"));
    assert_eq!(a.borrow().blur_calls, 1);
    assert_eq!(screen.focused_id(), None);
    screen.focus_next().unwrap();
    assert_eq!(screen.focused_id(), Some("b"));
}

#[test]
fn focused_component_renders_with_focus_flag() {
    let mut screen = headless(10, 2);
    screen.register_component("a", Probe::focusable("a").shared(), row(0)).unwrap();
    screen.register_component("b", Probe::focusable("b").shared(), row(1)).unwrap();
    screen.render().unwrap();
    assert_eq!(screen.buffer().row_text(0), "*a        ");
    assert_eq!(screen.buffer().row_text(1), "b         ");

    screen.focus_next().unwrap();
    assert_eq!(screen.buffer().row_text(0), "a         ");
    assert_eq!(screen.buffer().row_text(1), "*b        ");
}
