// Soundkeys Resolver
// Exact-match lookup of a (key, modifier set) pair in a binding table

use crate::action::ActionKind;
use crate::mapping::BindingTable;
use crate::modifier::ModifierSet;

/// Find the action bound to a key event.
///
/// The binding's modifier set must equal `modifiers` exactly; supersets and
/// subsets never match. Capslock counts like any other modifier, so callers
/// wanting capslock-insensitive lookups strip it first (see
/// [`CapsLockPolicy`](crate::modifier::CapsLockPolicy)).
///
/// Returns `None` when nothing is bound, which is a normal outcome.
pub fn resolve<'a>(
    table: &'a BindingTable,
    key: &str,
    modifiers: &ModifierSet,
) -> Option<&'a ActionKind> {
    let action = table.find(key, modifiers).map(|binding| &binding.action);
    if action.is_none() {
        log::trace!("No binding for key='{}' modifiers=[{}]", key, modifiers);
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyCode;
    use crate::mapping::apply_edit;
    use crate::modifier::Modifier;

    #[test]
    fn test_resolve_scenario() {
        let (table, _) = apply_edit(
            &BindingTable::new(),
            &KeyCode::from("a"),
            &ModifierSet::new(),
            ActionKind::sound("x.wav", false),
        );
        assert_eq!(
            resolve(&table, "a", &ModifierSet::new()),
            Some(&ActionKind::sound("x.wav", false))
        );
        assert_eq!(
            resolve(&table, "a", &ModifierSet::from([Modifier::Shift])),
            None
        );
    }

    #[test]
    fn test_resolve_missing_key() {
        assert_eq!(resolve(&BindingTable::new(), "q", &ModifierSet::new()), None);
    }

    #[test]
    fn test_resolve_no_subset_or_superset_match() {
        let key = KeyCode::from("k");
        let shift_ctrl = ModifierSet::from([Modifier::Shift, Modifier::Ctrl]);
        let (table, _) = apply_edit(&BindingTable::new(), &key, &shift_ctrl, ActionKind::StopAll);

        assert_eq!(resolve(&table, "k", &shift_ctrl), Some(&ActionKind::StopAll));
        assert_eq!(resolve(&table, "k", &ModifierSet::from([Modifier::Shift])), None);
        assert_eq!(
            resolve(
                &table,
                "k",
                &ModifierSet::from([Modifier::Shift, Modifier::Ctrl, Modifier::Alt])
            ),
            None
        );
    }

    #[test]
    fn test_resolve_capslock_is_distinguishing() {
        let (table, _) = apply_edit(
            &BindingTable::new(),
            &KeyCode::from("a"),
            &ModifierSet::new(),
            ActionKind::StopLooping,
        );
        assert_eq!(
            resolve(&table, "a", &ModifierSet::from([Modifier::CapsLock])),
            None
        );
    }
}
