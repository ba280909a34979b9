use uuid::Uuid;

use crate::bridge::PowerBridge;
use crate::device::{ServiceDescriptor, ServiceGroupDescriptor, ServiceKind};

/// Displayed on/off state of a menu row. `Unknown` is used when the cached
/// characteristic value could not be decoded; it renders unchecked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    On,
    Off,
    Unknown,
}

impl ItemState {
    fn from_cached(value: Option<bool>) -> ItemState {
        match value {
            Some(true) => ItemState::On,
            Some(false) => ItemState::Off,
            None => ItemState::Unknown,
        }
    }

    pub fn is_checked(self) -> bool {
        self == ItemState::On
    }
}

/// SF Symbols glyph shown next to the row title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    PowerPlug,
    LightBulb,
    Switch,
}

impl Glyph {
    pub fn symbol_name(self) -> &'static str {
        match self {
            Glyph::PowerPlug => "powerplug",
            Glyph::LightBulb => "lightbulb",
            Glyph::Switch => "switch.2",
        }
    }

    /// Glyph for a single device, by service category. Outlets keep the
    /// generic power-plug glyph.
    pub fn for_service(kind: ServiceKind) -> Glyph {
        match kind {
            ServiceKind::Lightbulb => Glyph::LightBulb,
            ServiceKind::Switch => Glyph::Switch,
            ServiceKind::Outlet | ServiceKind::Other => Glyph::PowerPlug,
        }
    }
}

/// One menu row bound to the power-state characteristics of a device or a
/// device group. The row is a view over bridge-owned truth: it never caches
/// state authoritatively, and every operation goes back to the bridge.
///
/// Only the two factory constructors exist; a row cannot be built without at
/// least one power-state characteristic to control.
#[derive(Debug)]
pub struct ToggleMenuItem {
    title: String,
    glyph: Glyph,
    ids: Vec<Uuid>,
    state: ItemState,
}

impl ToggleMenuItem {
    /// Builds a row controlling every power-state characteristic across the
    /// group's member services, in discovery order (duplicates kept).
    /// Returns `None` when the group has nothing to control.
    pub fn from_group(group: &ServiceGroupDescriptor, glyph: Glyph) -> Option<Self> {
        let matches: Vec<_> = group
            .services
            .iter()
            .flat_map(|s| s.characteristics.iter())
            .filter(|c| c.is_power_state())
            .collect();

        let sample = matches.first()?;
        let state = ItemState::from_cached(sample.value.as_ref().and_then(|v| v.power_on()));
        let ids = matches.iter().map(|c| c.id).collect();

        Some(Self {
            title: group.name.clone(),
            glyph,
            ids,
            state,
        })
    }

    /// Builds a row for a single device from its first power-state
    /// characteristic, or `None` when it has none.
    pub fn from_service(service: &ServiceDescriptor, glyph: Glyph) -> Option<Self> {
        let chara = service.characteristics.iter().find(|c| c.is_power_state())?;
        let state = ItemState::from_cached(chara.value.as_ref().and_then(|v| v.power_on()));

        Some(Self {
            title: service.name.clone(),
            glyph,
            ids: vec![chara.id],
            state,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn glyph(&self) -> Glyph {
        self.glyph
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn uuids(&self) -> &[Uuid] {
        &self.ids
    }

    pub fn binds(&self, id: Uuid) -> bool {
        self.ids.contains(&id)
    }

    /// Handles a click on the row.
    ///
    /// A single device is toggled through the bridge and the checkmark flips
    /// optimistically. A group is forced uniform instead: the first member's
    /// state decides the direction and every member gets an explicit set to
    /// its negation, so a split group lands in one consistent state. The
    /// group checkmark is left for the next update pass. If the first
    /// member's state cannot be read, nothing is written.
    pub fn toggle(&mut self, bridge: &dyn PowerBridge) {
        if self.ids.len() == 1 {
            bridge.toggle_power(self.ids[0]);
            self.state = match self.state {
                ItemState::On => ItemState::Off,
                ItemState::Off | ItemState::Unknown => ItemState::On,
            };
        } else {
            let Some(&sample) = self.ids.first() else {
                return;
            };
            let Some(current) = bridge.power_state(sample) else {
                return;
            };
            for &id in &self.ids {
                bridge.set_power(id, !current);
            }
        }
    }

    /// Resynchronizes the checkmark with live bridge state. The pushed
    /// `value` is treated purely as a change signal; the bridge stays the
    /// source of truth and is re-read. An unreadable state leaves the row
    /// untouched.
    pub fn update(&mut self, _value: i64, bridge: &dyn PowerBridge) {
        let Some(&sample) = self.ids.first() else {
            return;
        };
        let Some(on) = bridge.power_state(sample) else {
            return;
        };
        self.state = if on { ItemState::On } else { ItemState::Off };
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;
    use crate::device::{Characteristic, CharacteristicKind, CharacteristicValue};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Toggle(Uuid),
        Get(Uuid),
        Set(Uuid, bool),
    }

    #[derive(Default)]
    struct MockBridge {
        states: HashMap<Uuid, bool>,
        calls: RefCell<Vec<Call>>,
    }

    impl MockBridge {
        fn with_state(id: Uuid, on: bool) -> Self {
            let mut bridge = Self::default();
            bridge.states.insert(id, on);
            bridge
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }
    }

    impl PowerBridge for MockBridge {
        fn toggle_power(&self, id: Uuid) {
            self.calls.borrow_mut().push(Call::Toggle(id));
        }

        fn power_state(&self, id: Uuid) -> Option<bool> {
            self.calls.borrow_mut().push(Call::Get(id));
            self.states.get(&id).copied()
        }

        fn set_power(&self, id: Uuid, on: bool) {
            self.calls.borrow_mut().push(Call::Set(id, on));
        }
    }

    fn power_chara(id: Uuid, value: Option<CharacteristicValue>) -> Characteristic {
        Characteristic {
            kind: CharacteristicKind::PowerState,
            id,
            value,
        }
    }

    fn other_chara(id: Uuid) -> Characteristic {
        Characteristic {
            kind: CharacteristicKind::Brightness,
            id,
            value: Some(CharacteristicValue::Int(50)),
        }
    }

    fn service(name: &str, charas: Vec<Characteristic>) -> ServiceDescriptor {
        ServiceDescriptor {
            name: name.to_string(),
            kind: ServiceKind::Lightbulb,
            characteristics: charas,
        }
    }

    fn group(name: &str, services: Vec<ServiceDescriptor>) -> ServiceGroupDescriptor {
        ServiceGroupDescriptor {
            name: name.to_string(),
            services,
        }
    }

    #[test]
    fn group_construction_collects_power_ids_in_discovery_order() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let g = group(
            "All Lights",
            vec![
                service(
                    "Desk",
                    vec![
                        power_chara(a, Some(CharacteristicValue::Int(1))),
                        other_chara(Uuid::new_v4()),
                    ],
                ),
                service("Shelf", vec![power_chara(b, None)]),
                // Duplicate identifiers are kept as discovered.
                service("Corner", vec![power_chara(c, None), power_chara(a, None)]),
            ],
        );

        let item = ToggleMenuItem::from_group(&g, Glyph::LightBulb).unwrap();
        assert_eq!(item.title(), "All Lights");
        assert_eq!(item.uuids(), &[a, b, c, a]);
        assert!(item.binds(b));
        assert!(!item.binds(Uuid::new_v4()));
    }

    #[test]
    fn group_without_power_characteristics_is_not_built() {
        let g = group(
            "Sensors",
            vec![service("Thermo", vec![other_chara(Uuid::new_v4())])],
        );
        assert!(ToggleMenuItem::from_group(&g, Glyph::LightBulb).is_none());
    }

    #[test]
    fn service_construction_takes_first_power_characteristic() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let s = service(
            "Desk Lamp",
            vec![
                other_chara(Uuid::new_v4()),
                power_chara(a, Some(CharacteristicValue::Int(0))),
                power_chara(b, Some(CharacteristicValue::Int(1))),
            ],
        );

        let item = ToggleMenuItem::from_service(&s, Glyph::PowerPlug).unwrap();
        assert_eq!(item.title(), "Desk Lamp");
        assert_eq!(item.uuids(), &[a]);
        assert_eq!(item.state(), ItemState::Off);
    }

    #[test]
    fn service_without_power_characteristic_is_not_built() {
        let s = service("Thermo", vec![other_chara(Uuid::new_v4())]);
        assert!(ToggleMenuItem::from_service(&s, Glyph::PowerPlug).is_none());
    }

    #[test]
    fn initial_state_comes_from_cached_value() {
        let on = service(
            "On",
            vec![power_chara(Uuid::new_v4(), Some(CharacteristicValue::Int(7)))],
        );
        let off = service(
            "Off",
            vec![power_chara(Uuid::new_v4(), Some(CharacteristicValue::Int(0)))],
        );
        let odd = service(
            "Odd",
            vec![power_chara(
                Uuid::new_v4(),
                Some(CharacteristicValue::Text("on".to_string())),
            )],
        );
        let missing = service("Missing", vec![power_chara(Uuid::new_v4(), None)]);

        let mk = |s: &ServiceDescriptor| {
            ToggleMenuItem::from_service(s, Glyph::PowerPlug).unwrap().state()
        };
        assert_eq!(mk(&on), ItemState::On);
        assert_eq!(mk(&off), ItemState::Off);
        assert_eq!(mk(&odd), ItemState::Unknown);
        assert_eq!(mk(&missing), ItemState::Unknown);
        assert!(!mk(&odd).is_checked());
    }

    #[test]
    fn single_id_toggle_is_optimistic() {
        let id = Uuid::new_v4();
        let s = service("Lamp", vec![power_chara(id, Some(CharacteristicValue::Int(1)))]);
        let mut item = ToggleMenuItem::from_service(&s, Glyph::PowerPlug).unwrap();
        let bridge = MockBridge::default();

        item.toggle(&bridge);
        assert_eq!(bridge.calls(), vec![Call::Toggle(id)]);
        assert_eq!(item.state(), ItemState::Off);

        item.toggle(&bridge);
        assert_eq!(bridge.calls(), vec![Call::Toggle(id), Call::Toggle(id)]);
        assert_eq!(item.state(), ItemState::On);
    }

    #[test]
    fn unknown_state_toggles_to_on() {
        let id = Uuid::new_v4();
        let s = service("Lamp", vec![power_chara(id, None)]);
        let mut item = ToggleMenuItem::from_service(&s, Glyph::PowerPlug).unwrap();

        item.toggle(&MockBridge::default());
        assert_eq!(item.state(), ItemState::On);
    }

    #[test]
    fn group_toggle_forces_all_members_to_negation_of_first() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let g = group(
            "All Lights",
            vec![
                service("A", vec![power_chara(a, Some(CharacteristicValue::Int(1)))]),
                service("B", vec![power_chara(b, None)]),
                service("C", vec![power_chara(c, None)]),
            ],
        );
        let mut item = ToggleMenuItem::from_group(&g, Glyph::LightBulb).unwrap();
        let bridge = MockBridge::with_state(a, true);

        item.toggle(&bridge);
        assert_eq!(
            bridge.calls(),
            vec![
                Call::Get(a),
                Call::Set(a, false),
                Call::Set(b, false),
                Call::Set(c, false),
            ]
        );
        // The checkmark is left for the next update pass.
        assert_eq!(item.state(), ItemState::On);
    }

    #[test]
    fn group_toggle_aborts_when_first_state_is_unreadable() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let g = group(
            "All Lights",
            vec![
                service("A", vec![power_chara(a, None)]),
                service("B", vec![power_chara(b, None)]),
            ],
        );
        let mut item = ToggleMenuItem::from_group(&g, Glyph::LightBulb).unwrap();
        let bridge = MockBridge::default();

        item.toggle(&bridge);
        assert_eq!(bridge.calls(), vec![Call::Get(a)]);
    }

    #[test]
    fn update_rereads_bridge_and_ignores_argument() {
        let id = Uuid::new_v4();
        let s = service("Lamp", vec![power_chara(id, Some(CharacteristicValue::Int(0)))]);
        let mut item = ToggleMenuItem::from_service(&s, Glyph::PowerPlug).unwrap();

        let bridge = MockBridge::with_state(id, true);
        // Argument says "off"; the bridge says on and wins.
        item.update(0, &bridge);
        assert_eq!(bridge.calls(), vec![Call::Get(id)]);
        assert_eq!(item.state(), ItemState::On);
    }

    #[test]
    fn update_is_a_noop_when_bridge_cannot_answer() {
        let id = Uuid::new_v4();
        let s = service("Lamp", vec![power_chara(id, Some(CharacteristicValue::Int(1)))]);
        let mut item = ToggleMenuItem::from_service(&s, Glyph::PowerPlug).unwrap();

        item.update(0, &MockBridge::default());
        assert_eq!(item.state(), ItemState::On);
    }

    #[test]
    fn glyph_selection_follows_service_kind() {
        assert_eq!(Glyph::for_service(ServiceKind::Lightbulb), Glyph::LightBulb);
        assert_eq!(Glyph::for_service(ServiceKind::Switch), Glyph::Switch);
        assert_eq!(Glyph::for_service(ServiceKind::Outlet), Glyph::PowerPlug);
        assert_eq!(Glyph::for_service(ServiceKind::Other), Glyph::PowerPlug);

        assert_eq!(Glyph::LightBulb.symbol_name(), "lightbulb");
        assert_eq!(Glyph::Switch.symbol_name(), "switch.2");
        assert_eq!(Glyph::PowerPlug.symbol_name(), "powerplug");
    }
}
