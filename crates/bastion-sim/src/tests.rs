#[cfg(test)]
mod tests {
    use glam::DVec2;
    use hecs::World;

    use bastion_core::commands::ShipCommand;
    use bastion_core::config::{PowerModeTuning, ReservoirTuning, WeaponSpec};
    use bastion_core::enums::*;
    use bastion_core::events::CombatEvent;
    use bastion_core::state::ShipStatus;
    use bastion_core::error::TuningError;
    use bastion_core::types::{Contact, ContactId, Kinematics, PowerModifier, ShipId, ShipOverrides};

    use crate::engine::{EngineError, SimConfig, SimulationEngine, TickInput, TickOutput};
    use crate::posture::{AbsorptionField, Defense, Deflector};
    use crate::reservoir::{Draw, EnergyReservoir};
    use crate::ship::{ShipBlueprint, WeaponMount};
    use crate::systems::power;
    use crate::weapons::{EnergyCell, FireContext, Magazine, Weapon};

    const DT: f64 = 1.0 / 60.0;
    const EPS: f64 = 1e-9;

    fn engine() -> SimulationEngine {
        SimulationEngine::new(SimConfig::default()).unwrap()
    }

    fn step(engine: &mut SimulationEngine, contacts: &[Contact]) -> TickOutput {
        engine.tick(TickInput { dt: DT, contacts })
    }

    /// Run `ticks` ticks and collect every event.
    fn run(engine: &mut SimulationEngine, contacts: &[Contact], ticks: usize) -> Vec<CombatEvent> {
        (0..ticks).flat_map(|_| step(engine, contacts).events).collect()
    }

    fn count(events: &[CombatEvent], pred: impl Fn(&CombatEvent) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    fn fire_ctx<'a>(
        owner: &'a Kinematics,
        reservoir: &'a mut EnergyReservoir,
        target: DVec2,
        now: f64,
    ) -> FireContext<'a> {
        FireContext {
            ship: ShipId(0),
            owner,
            reservoir,
            target,
            now,
            lock_target: None,
            modifier: &PowerModifier::NEUTRAL,
        }
    }

    fn assert_segments_valid(reservoir: &EnergyReservoir) {
        for s in reservoir.segments() {
            assert!(s.charge() >= 0.0, "negative charge {s:?}");
            assert!(s.charge() <= s.current_length() + EPS, "overcharged {s:?}");
            assert!(s.current_length() <= s.max_length() + EPS);
        }
    }

    // ---- Reservoir ----

    #[test]
    fn test_reservoir_conservation_over_mixed_sequence() {
        let mut r = EnergyReservoir::new(3, 100.0);
        let ops: [(bool, f64); 8] = [
            (true, 50.0),
            (true, 80.0),
            (false, 40.0),
            (true, 1000.0),
            (false, 15.5),
            (false, 400.0),
            (true, -5.0),
            (false, f64::NAN),
        ];
        for (is_drain, amount) in ops {
            let before = r.total_charge();
            let applied = if is_drain { r.drain(amount) } else { r.refill(amount) };
            let requested = Draw::Amount(amount).amount();
            assert!(applied <= requested + EPS);
            assert!(applied >= 0.0);
            let expected = if is_drain { before - applied } else { before + applied };
            assert!((r.total_charge() - expected).abs() < EPS);
            assert_segments_valid(&r);
        }
        assert!((r.total_charge() - 300.0).abs() < EPS);
    }

    #[test]
    fn test_drain_is_front_to_back() {
        let mut r = EnergyReservoir::new(3, 100.0);
        assert!((r.drain(30.0) - 30.0).abs() < EPS);
        let s = r.segments();
        assert!((s[0].charge() - 70.0).abs() < EPS);
        assert!((s[1].charge() - 100.0).abs() < EPS);
        assert!((s[2].charge() - 100.0).abs() < EPS);

        r.drain(120.0);
        let s = r.segments();
        assert_eq!(s[0].charge(), 0.0);
        assert!((s[1].charge() - 50.0).abs() < EPS);
        assert!((s[2].charge() - 100.0).abs() < EPS);
    }

    #[test]
    fn test_refill_is_back_to_front() {
        let mut r = EnergyReservoir::new(3, 100.0);
        r.drain(300.0);
        assert!(r.is_helpless());

        assert!((r.refill(60.0) - 60.0).abs() < EPS);
        let s = r.segments();
        assert_eq!(s[0].charge(), 0.0);
        assert_eq!(s[1].charge(), 0.0);
        assert!((s[2].charge() - 60.0).abs() < EPS);

        r.refill(Draw::Rate {
            per_sec: 10.0,
            dt: 5.0,
        });
        let s = r.segments();
        assert_eq!(s[0].charge(), 0.0);
        assert!((s[1].charge() - 10.0).abs() < EPS);
        assert!((s[2].charge() - 100.0).abs() < EPS);
    }

    #[test]
    fn test_capacity_damage_clamps_charge() {
        let mut r = EnergyReservoir::new(2, 100.0);
        assert!((r.apply_capacity_damage(130.0) - 130.0).abs() < EPS);
        let s = r.segments();
        assert_eq!(s[0].current_length(), 0.0);
        assert_eq!(s[0].charge(), 0.0);
        assert!((s[1].current_length() - 70.0).abs() < EPS);
        assert!((s[1].charge() - 70.0).abs() < EPS);
        assert_segments_valid(&r);
        assert!(r.is_full());

        // Only what is left can be removed.
        assert!((r.apply_capacity_damage(500.0) - 70.0).abs() < EPS);
        assert!(r.is_destroyed());
        assert!(r.is_helpless());
        assert_eq!(r.charge_percent(), 0.0);
        assert_eq!(r.refill(50.0), 0.0);
    }

    #[test]
    fn test_try_drain_is_all_or_nothing() {
        let mut r = EnergyReservoir::new(1, 100.0);
        r.drain(90.0);
        assert!(!r.try_drain(15.0));
        assert!((r.total_charge() - 10.0).abs() < EPS);
        assert!(r.try_drain(10.0));
        assert!(r.is_helpless());
    }

    // ---- Postures ----

    #[test]
    fn test_deflector_drains_where_absorption_charges() {
        let overrides = ShipOverrides::default();

        let mut r_deflector = EnergyReservoir::new(2, 100.0);
        r_deflector.drain(50.0);
        let mut deflector = Deflector::new(Default::default());
        assert!(deflector.toggle(&overrides, &r_deflector));

        let mut r_field = r_deflector.clone();
        let mut field = AbsorptionField::new(Default::default());
        assert!(field.toggle(&overrides, &r_field));

        let before = r_deflector.total_charge();
        assert_eq!(deflector.apply_damage(20.0, 1.0, &mut r_deflector), 0.0);
        assert_eq!(field.apply_damage(20.0, 1.0, &mut r_field), 0.0);

        assert!(r_deflector.total_charge() < before);
        assert!(r_field.total_charge() > before);
        assert!((r_deflector.total_charge() - 140.0).abs() < EPS);
        assert!((r_field.total_charge() - 160.0).abs() < EPS);
    }

    #[test]
    fn test_deflector_overflow_and_collapse() {
        let mut r = EnergyReservoir::new(4, 100.0);
        let mut deflector = Deflector::new(Default::default());
        deflector.toggle(&ShipOverrides::default(), &r);

        let overflow = deflector.apply_damage(150.0, 2.0, &mut r);
        assert!((overflow - 30.0).abs() < EPS);
        assert_eq!(deflector.current_strength(), 0.0);
        assert!((r.total_charge() - 325.0).abs() < EPS);
        assert!(deflector.view().hit_flash_secs > 0.0);
        assert_eq!(deflector.last_hit_time(), Some(2.0));
        // Down as soon as the hit empties it; the collapse is reported on update.
        assert!(!deflector.is_up());

        assert!(deflector.update(DT, 2.0 + DT, &mut r, &PowerModifier::NEUTRAL));
        assert!(!deflector.is_up());
        // No strength left: raising is refused until it regenerates.
        assert!(!deflector.toggle(&ShipOverrides::default(), &r));
        deflector.update(1.0, 3.0, &mut r, &PowerModifier::NEUTRAL);
        assert!((deflector.current_strength() - 12.0).abs() < EPS);
        assert!(deflector.toggle(&ShipOverrides::default(), &r));
    }

    #[test]
    fn test_broken_deflector_stops_taking_hits_before_next_update() {
        let mut r = EnergyReservoir::new(4, 100.0);
        let mut deflector = Deflector::new(Default::default());
        deflector.toggle(&ShipOverrides::default(), &r);
        deflector.apply_damage(120.0, 1.0, &mut r);
        let charge = r.total_charge();

        // A second hit in the same frame passes straight through.
        let overflow = deflector.apply_damage(40.0, 1.0, &mut r);
        assert!((overflow - 40.0).abs() < EPS);
        assert!((r.total_charge() - charge).abs() < EPS);

        // The collapse is reported exactly once.
        assert!(deflector.update(DT, 1.0 + DT, &mut r, &PowerModifier::NEUTRAL));
        assert!(!deflector.update(DT, 1.0 + 2.0 * DT, &mut r, &PowerModifier::NEUTRAL));
    }

    #[test]
    fn test_deflector_collapses_when_reservoir_runs_dry() {
        let mut r = EnergyReservoir::new(1, 100.0);
        let mut deflector = Deflector::new(Default::default());
        deflector.toggle(&ShipOverrides::default(), &r);
        r.drain(99.95);

        assert!(deflector.update(DT, DT, &mut r, &PowerModifier::NEUTRAL));
        assert!(!deflector.is_up());
        assert!(!deflector.toggle(&ShipOverrides::default(), &r));
    }

    #[test]
    fn test_posture_lock_blocks_raise_but_not_lower() {
        let r = EnergyReservoir::new(2, 100.0);
        let locked = ShipOverrides {
            posture_locked: true,
        };
        let mut field = AbsorptionField::new(Default::default());
        assert!(!field.toggle(&locked, &r));
        assert!(field.toggle(&ShipOverrides::default(), &r));
        assert!(!field.toggle(&locked, &r));
    }

    #[test]
    fn test_absorption_bypasses_only_when_full() {
        let mut r = EnergyReservoir::new(2, 100.0);
        let mut field = AbsorptionField::new(Default::default());
        field.toggle(&ShipOverrides::default(), &r);

        // Exactly full: damage passes through and costs capacity.
        assert!((field.apply_damage(30.0, 0.0, &mut r) - 30.0).abs() < EPS);
        assert!((r.total_capacity() - 170.0).abs() < EPS);
        assert!((r.total_charge() - 170.0).abs() < EPS);
        assert_segments_valid(&r);

        // Any headroom at all: converted, even past the remaining headroom.
        r.drain(1.0);
        assert_eq!(field.apply_damage(30.0, 0.0, &mut r), 0.0);
        assert!((r.total_charge() - 170.0).abs() < EPS);
        assert!((r.total_capacity() - 170.0).abs() < EPS);
    }

    #[test]
    fn test_lowered_posture_passes_everything() {
        let mut r = EnergyReservoir::new(2, 100.0);
        let mut deflector = Deflector::new(Default::default());
        assert!((deflector.apply_damage(40.0, 0.0, &mut r) - 40.0).abs() < EPS);
        assert!((r.total_charge() - 200.0).abs() < EPS);
        assert_eq!(deflector.apply_damage(f64::NAN, 0.0, &mut r), 0.0);
    }

    // ---- Weapons ----

    #[test]
    fn test_fixed_cooldown_scaled_by_power_mode() {
        let owner = Kinematics::default();
        let mut r = EnergyReservoir::new(1, 100.0);
        let mut laser = Weapon::new(WeaponSpec::preset(WeaponClass::PulseLaser), 0, DVec2::ZERO).unwrap();
        assert!(laser
            .fire(fire_ctx(&owner, &mut r, DVec2::new(100.0, 0.0), 0.0))
            .is_some());

        let offensive = PowerModeTuning::default().modifier(PowerMode::Offensive);
        assert!(laser.can_fire(0.33, None, &offensive));
        assert!(!laser.can_fire(0.33, None, &PowerModifier::NEUTRAL));
        assert!(laser.can_fire(0.4, None, &PowerModifier::NEUTRAL));
        assert!((laser.cooldown_remaining(0.1, &PowerModifier::NEUTRAL) - 0.3).abs() < EPS);
    }

    #[test]
    fn test_non_finite_geometry_refuses_without_side_effects() {
        let owner = Kinematics::default();
        let mut r = EnergyReservoir::new(1, 100.0);
        let mut laser = Weapon::new(WeaponSpec::preset(WeaponClass::PulseLaser), 0, DVec2::ZERO).unwrap();

        let bad = DVec2::new(f64::NAN, 5.0);
        assert!(laser.fire(fire_ctx(&owner, &mut r, bad, 1.0)).is_none());
        assert_eq!(laser.last_fire_time(), None);

        let mut drifting = owner;
        drifting.position.x = f64::INFINITY;
        assert!(laser
            .fire(fire_ctx(&drifting, &mut r, DVec2::new(1.0, 0.0), 1.0))
            .is_none());

        let volley = laser
            .fire(fire_ctx(&owner, &mut r, DVec2::new(0.0, 50.0), 1.0))
            .unwrap();
        let shot = &volley.requests[0];
        assert!((shot.rotation - std::f64::consts::FRAC_PI_2).abs() < EPS);
        assert!((shot.lifetime - 0.75).abs() < EPS);
    }

    #[test]
    fn test_shot_origin_follows_mount_and_heading() {
        let owner = Kinematics {
            position: DVec2::new(10.0, 0.0),
            rotation: std::f64::consts::FRAC_PI_2,
            velocity: DVec2::ZERO,
        };
        let mut r = EnergyReservoir::new(1, 100.0);
        let mut laser =
            Weapon::new(WeaponSpec::preset(WeaponClass::PulseLaser), 0, DVec2::new(5.0, 0.0)).unwrap();
        let volley = laser
            .fire(fire_ctx(&owner, &mut r, DVec2::new(10.0, 100.0), 0.0))
            .unwrap();
        let origin = volley.requests[0].origin;
        assert!((origin - DVec2::new(10.0, 5.0)).length() < 1e-6);
    }

    #[test]
    fn test_energy_weapon_starved_never_fires_or_reloads_partially() {
        let owner = Kinematics::default();
        let mut r = EnergyReservoir::new(1, 100.0);
        r.drain(90.0);
        let mut ion = Weapon::new(WeaponSpec::preset(WeaponClass::IonCannon), 0, DVec2::ZERO).unwrap();

        assert!(!ion.can_fire(5.0, Some(&r), &PowerModifier::NEUTRAL));
        assert!(ion
            .fire(fire_ctx(&owner, &mut r, DVec2::new(100.0, 0.0), 5.0))
            .is_none());
        assert!((r.total_charge() - 10.0).abs() < EPS);
        assert_eq!(ion.view(5.0, &r, &PowerModifier::NEUTRAL).loaded, Some(3));

        let mut cell = EnergyCell::new(3, 2.0, 0.8, 15.0);
        cell.consume();
        cell.update(3.0, &mut r);
        assert_eq!(cell.loaded(), 2);
        assert!((cell.reload_progress() - 2.0).abs() < EPS);
        assert!((r.total_charge() - 10.0).abs() < EPS);

        // Affordable again: the held reload completes on the next tick.
        r.refill(10.0);
        cell.update(DT, &mut r);
        assert_eq!(cell.loaded(), 3);
        assert!((r.total_charge() - 5.0).abs() < EPS);
    }

    #[test]
    fn test_magazine_tops_off_one_round_at_a_time() {
        let mut mag = Magazine::new(12, 120, 0.5, 0.15);
        mag.consume();
        mag.consume();
        mag.consume();
        assert_eq!(mag.loaded(), 9);

        mag.update(0.5);
        assert_eq!((mag.loaded(), mag.stored()), (10, 119));
        mag.update(0.25);
        assert_eq!(mag.loaded(), 10);
        mag.update(0.25);
        assert_eq!(mag.loaded(), 11);

        // A long tick still moves only one round.
        mag.update(10.0);
        assert_eq!(mag.loaded(), 12);
        assert_eq!(mag.stored(), 117);
    }

    #[test]
    fn test_empty_store_stops_reloading() {
        let mut mag = Magazine::new(2, 0, 0.5, 0.1);
        mag.consume();
        mag.update(5.0);
        assert_eq!(mag.loaded(), 1);
        assert!(mag.can_fire(1.0));
        mag.consume();
        assert!(!mag.can_fire(1.0));
    }

    // ---- Systems ----

    #[test]
    fn test_defensive_mode_speeds_refill() {
        let mut world = World::new();
        let mut drained = EnergyReservoir::new(2, 100.0);
        drained.drain(100.0);
        let balanced = world.spawn((drained.clone(), PowerMode::Balanced));
        let defensive = world.spawn((drained, PowerMode::Defensive));

        power::refill(
            &mut world,
            1.0,
            &ReservoirTuning::default(),
            &PowerModeTuning::default(),
        );

        let charge = |e| world.get::<&EnergyReservoir>(e).unwrap().total_charge();
        assert!((charge(balanced) - 108.0).abs() < EPS);
        assert!((charge(defensive) - 109.6).abs() < EPS);
    }

    // ---- Engine ----

    #[test]
    fn test_spawn_assigns_ids_and_segment_layout() {
        let mut engine = engine();
        let a = engine
            .spawn_ship(ShipBlueprint::new(HullClass::Cruiser, PostureKind::Deflector))
            .unwrap();
        let b = engine
            .spawn_ship(ShipBlueprint::new(HullClass::Corvette, PostureKind::AbsorptionField))
            .unwrap();
        assert_ne!(a, b);

        let status = engine.status(a).unwrap();
        assert_eq!(status.reservoir.segments.len(), 3);
        assert!((status.reservoir.total_charge - 300.0).abs() < EPS);
        assert!(!status.posture.up);
        assert_eq!(status.posture.strength, Some(120.0));
        assert_eq!(status.lock.phase, LockPhase::Idle);

        let status = engine.status(b).unwrap();
        assert_eq!(status.reservoir.segments.len(), 1);
        assert_eq!(status.posture.strength, None);
    }

    #[test]
    fn test_invalid_weapon_spec_rejected_at_spawn() {
        let mut engine = engine();
        let mut spec = WeaponSpec::preset(WeaponClass::PulseLaser);
        spec.max_hp = 0.0;
        let blueprint = ShipBlueprint::new(HullClass::Frigate, PostureKind::Deflector).with_mount(WeaponMount {
            spec,
            offset: DVec2::ZERO,
        });
        assert!(matches!(
            engine.spawn_ship(blueprint),
            Err(EngineError::Tuning(TuningError::InvalidWeapon { .. }))
        ));
        assert!(engine.ships().is_empty());
    }

    #[test]
    fn test_unknown_ship_and_slot_are_errors() {
        let mut engine = engine();
        let ship = engine
            .spawn_ship(ShipBlueprint::new(HullClass::Frigate, PostureKind::Deflector))
            .unwrap();

        assert!(matches!(
            engine.set_aim(ShipId(99), None),
            Err(EngineError::UnknownShip(ShipId(99)))
        ));
        assert!(matches!(
            engine.damage_weapon(ship, 3, 10.0),
            Err(EngineError::UnknownWeapon { slot: 3, .. })
        ));

        engine.despawn_ship(ship).unwrap();
        assert!(engine.status(ship).is_none());
        assert!(engine.despawn_ship(ship).is_err());
        assert!(engine.apply_damage(ship, 5.0).is_err());

        // Commands for a despawned ship are dropped quietly.
        engine.queue_command(ShipCommand::TogglePosture { ship });
        assert!(run(&mut engine, &[], 1).is_empty());
    }

    #[test]
    fn test_deflector_broken_between_ticks_collapses_on_next_tick() {
        let mut engine = engine();
        let ship = engine
            .spawn_ship(ShipBlueprint::new(HullClass::Frigate, PostureKind::Deflector))
            .unwrap();
        engine.queue_command(ShipCommand::TogglePosture { ship });
        step(&mut engine, &[]);

        let report = engine.apply_damage(ship, 150.0).unwrap();
        assert!((report.unabsorbed - 30.0).abs() < EPS);
        let status = engine.status(ship).unwrap();
        assert!(!status.posture.up);

        let report = engine.apply_damage(ship, 50.0).unwrap();
        assert!((report.unabsorbed - 50.0).abs() < EPS);
        assert!(
            (engine.status(ship).unwrap().reservoir.total_charge - status.reservoir.total_charge)
                .abs()
                < EPS
        );

        let events = run(&mut engine, &[], 1);
        assert_eq!(
            count(&events, |e| matches!(
                e,
                CombatEvent::PostureCollapsed {
                    kind: PostureKind::Deflector,
                    ..
                }
            )),
            1
        );
        assert_eq!(
            count(&run(&mut engine, &[], 30), |e| matches!(
                e,
                CombatEvent::PostureCollapsed { .. }
            )),
            0
        );
    }

    #[test]
    fn test_invalid_dt_skips_tick() {
        let mut engine = engine();
        let ship = engine
            .spawn_ship(ShipBlueprint::new(HullClass::Frigate, PostureKind::Deflector))
            .unwrap();
        engine.queue_command(ShipCommand::TogglePosture { ship });

        let out = engine.tick(TickInput {
            dt: f64::NAN,
            contacts: &[],
        });
        assert_eq!(out.time.tick, 0);
        assert!(out.events.is_empty());

        // The queued toggle survives to the next valid tick.
        let out = step(&mut engine, &[]);
        assert_eq!(out.time.tick, 1);
        assert_eq!(
            count(&out.events, |e| matches!(e, CombatEvent::PostureToggled { up: true, .. })),
            1
        );
    }

    #[test]
    fn test_toggle_events_and_override() {
        let mut engine = engine();
        let ship = engine
            .spawn_ship(ShipBlueprint::new(HullClass::Frigate, PostureKind::Deflector))
            .unwrap();

        engine.queue_command(ShipCommand::TogglePosture { ship });
        let events = run(&mut engine, &[], 1);
        assert_eq!(
            events,
            vec![CombatEvent::PostureToggled {
                ship,
                kind: PostureKind::Deflector,
                up: true
            }]
        );

        engine
            .set_overrides(
                ship,
                ShipOverrides {
                    posture_locked: true,
                },
            )
            .unwrap();
        engine.queue_command(ShipCommand::TogglePosture { ship });
        let events = run(&mut engine, &[], 1);
        assert_eq!(
            count(&events, |e| matches!(e, CombatEvent::PostureToggled { up: false, .. })),
            1
        );

        engine.queue_command(ShipCommand::TogglePosture { ship });
        let events = run(&mut engine, &[], 1);
        assert!(events.is_empty());
        assert!(!engine.status(ship).unwrap().posture.up);
    }

    #[test]
    fn test_damage_report_and_reservoir_destruction_events() {
        let mut engine = engine();
        let ship = engine
            .spawn_ship(ShipBlueprint::new(HullClass::Corvette, PostureKind::AbsorptionField))
            .unwrap();

        // Down: everything reaches the hull.
        let report = engine.apply_damage(ship, 25.0).unwrap();
        assert_eq!(report.absorbed, 0.0);
        assert!((report.unabsorbed - 25.0).abs() < EPS);

        engine.queue_command(ShipCommand::TogglePosture { ship });
        run(&mut engine, &[], 1);

        // Up and full: the hit bypasses and costs capacity instead.
        let report = engine.apply_damage(ship, 100.0).unwrap();
        assert!((report.unabsorbed - 100.0).abs() < EPS);

        let events = run(&mut engine, &[], 1);
        assert_eq!(
            count(&events, |e| matches!(e, CombatEvent::PostureCollapsed { .. })),
            1
        );
        assert_eq!(
            count(&events, |e| matches!(e, CombatEvent::ReservoirDepleted { .. })),
            1
        );
        assert_eq!(
            count(&events, |e| matches!(e, CombatEvent::ReservoirDestroyed { .. })),
            1
        );

        // Edge-triggered: nothing repeats.
        assert!(run(&mut engine, &[], 30).is_empty());
        let status = engine.status(ship).unwrap();
        assert!(status.reservoir.destroyed);
        assert!(!status.posture.up);
    }

    #[test]
    fn test_absorption_converts_hits_into_charge() {
        let mut engine = engine();
        let ship = engine
            .spawn_ship(
                ShipBlueprint::new(HullClass::Frigate, PostureKind::AbsorptionField)
                    .with_weapon(WeaponClass::Lance, DVec2::ZERO),
            )
            .unwrap();
        engine.queue_command(ShipCommand::TogglePosture { ship });
        engine.queue_command(ShipCommand::Fire {
            ship,
            slot: 0,
            target: DVec2::new(200.0, 0.0),
        });
        run(&mut engine, &[], 120);
        let before = engine.status(ship).unwrap().reservoir.total_charge;
        assert!(before < 200.0);

        let report = engine.apply_damage(ship, 10.0).unwrap();
        assert!((report.absorbed - 10.0).abs() < EPS);
        let after = engine.status(ship).unwrap().reservoir.total_charge;
        assert!((after - before - 5.0).abs() < EPS);
    }

    #[test]
    fn test_beam_cooldown_equals_burn_length() {
        let mut engine = engine();
        let ship = engine
            .spawn_ship(
                ShipBlueprint::new(HullClass::Frigate, PostureKind::Deflector)
                    .with_weapon(WeaponClass::Lance, DVec2::ZERO),
            )
            .unwrap();

        engine.queue_command(ShipCommand::Fire {
            ship,
            slot: 0,
            target: DVec2::new(300.0, 0.0),
        });
        let out = step(&mut engine, &[]);
        let fired_at = out.time.elapsed_secs;
        assert_eq!(out.spawns.len(), 1);
        assert_eq!(out.beams.len(), 1);
        assert!(engine.status(ship).unwrap().weapons[0].firing);

        // Hold for a second, sweeping the endpoint with the aim.
        engine.set_aim(ship, Some(DVec2::new(300.0, 40.0))).unwrap();
        for _ in 0..60 {
            let out = step(&mut engine, &[]);
            assert_eq!(out.beams.len(), 1);
            assert_eq!(out.beams[0].endpoint, DVec2::new(300.0, 40.0));
            assert_eq!(out.beams[0].origin, DVec2::ZERO);
        }

        engine.queue_command(ShipCommand::ReleaseTrigger { ship, slot: 0 });
        let out = step(&mut engine, &[]);
        let released_at = out.time.elapsed_secs;
        let duration = out
            .events
            .iter()
            .find_map(|e| match e {
                CombatEvent::BeamStopped {
                    duration_secs,
                    reason: BeamStopReason::Released,
                    ..
                } => Some(*duration_secs),
                _ => None,
            })
            .unwrap();
        assert!((duration - (released_at - fired_at)).abs() < EPS);
        assert!(!engine.status(ship).unwrap().weapons[0].firing);

        // Refire attempts during the cooldown are ignored.
        engine.queue_command(ShipCommand::Fire {
            ship,
            slot: 0,
            target: DVec2::new(300.0, 0.0),
        });
        assert!(step(&mut engine, &[]).spawns.is_empty());

        let mut waited = DT;
        while !engine.status(ship).unwrap().weapons[0].ready {
            step(&mut engine, &[]);
            waited += DT;
            assert!(waited < 3.0, "beam never came off cooldown");
        }
        assert!((waited - duration).abs() <= DT + 1e-6);
    }

    #[test]
    fn test_beam_stops_at_duration_cap() {
        let mut engine = engine();
        let ship = engine
            .spawn_ship(
                ShipBlueprint::new(HullClass::Cruiser, PostureKind::Deflector)
                    .with_weapon(WeaponClass::Lance, DVec2::ZERO),
            )
            .unwrap();
        engine.queue_command(ShipCommand::Fire {
            ship,
            slot: 0,
            target: DVec2::new(300.0, 0.0),
        });
        let events = run(&mut engine, &[], 360);
        let stops: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                CombatEvent::BeamStopped {
                    duration_secs,
                    reason,
                    ..
                } => Some((*duration_secs, *reason)),
                _ => None,
            })
            .collect();
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].1, BeamStopReason::DurationCap);
        assert!((stops[0].0 - 5.0).abs() < EPS);
        assert!(!engine.status(ship).unwrap().weapons[0].ready);
    }

    #[test]
    fn test_disabling_a_firing_beam_stops_it() {
        let mut engine = engine();
        let ship = engine
            .spawn_ship(
                ShipBlueprint::new(HullClass::Frigate, PostureKind::Deflector)
                    .with_weapon(WeaponClass::Lance, DVec2::ZERO),
            )
            .unwrap();
        engine.queue_command(ShipCommand::Fire {
            ship,
            slot: 0,
            target: DVec2::new(300.0, 0.0),
        });
        run(&mut engine, &[], 30);

        engine.damage_weapon(ship, 0, 1000.0).unwrap();
        let out = step(&mut engine, &[]);
        assert_eq!(
            count(&out.events, |e| matches!(e, CombatEvent::WeaponDisabled { slot: 0, .. })),
            1
        );
        assert_eq!(
            count(&out.events, |e| matches!(
                e,
                CombatEvent::BeamStopped {
                    reason: BeamStopReason::Disabled,
                    ..
                }
            )),
            1
        );
        assert!(out.beams.is_empty());

        let weapon = engine.status(ship).unwrap().weapons[0];
        assert!(weapon.disabled);
        assert!(!weapon.firing);
        assert_eq!(weapon.hp, 0.0);

        // Further damage is not a second knockout.
        engine.damage_weapon(ship, 0, 10.0).unwrap();
        assert!(run(&mut engine, &[], 1).is_empty());
    }

    #[test]
    fn test_flak_burst_spawns_parallel_volley() {
        let mut engine = engine();
        let ship = engine
            .spawn_ship(
                ShipBlueprint::new(HullClass::Frigate, PostureKind::Deflector)
                    .with_weapon(WeaponClass::Flak, DVec2::ZERO),
            )
            .unwrap();
        engine.queue_command(ShipCommand::FireAll {
            ship,
            target: DVec2::new(500.0, 0.0),
        });
        let out = step(&mut engine, &[]);
        assert_eq!(out.spawns.len(), 5);
        assert_eq!(
            out.events,
            vec![CombatEvent::WeaponFired {
                ship,
                slot: 0,
                weapon: WeaponClass::Flak,
                shots: 5
            }]
        );

        let mut lateral: Vec<f64> = out.spawns.iter().map(|s| s.origin.y).collect();
        lateral.sort_by(f64::total_cmp);
        for pair in lateral.windows(2) {
            assert!((pair[1] - pair[0] - 6.0).abs() < 1e-6);
        }
        assert!(lateral[2].abs() < 1e-6);
        assert!(out.spawns.iter().all(|s| s.area_radius == Some(20.0)));

        // The whole volley shares one spread roll, so the lines stay parallel.
        let first = &out.spawns[0];
        let heading = first.target - first.origin;
        for shot in &out.spawns[1..] {
            assert!((shot.rotation - first.rotation).abs() < 1e-12);
            assert!(((shot.target - shot.origin) - heading).length() < 1e-9);
        }

        // On cooldown next tick.
        engine.queue_command(ShipCommand::FireAll {
            ship,
            target: DVec2::new(500.0, 0.0),
        });
        assert!(step(&mut engine, &[]).spawns.is_empty());
    }

    #[test]
    fn test_lock_acquires_once_and_breaks_once() {
        let mut engine = engine();
        let ship = engine
            .spawn_ship(ShipBlueprint::new(HullClass::Frigate, PostureKind::Deflector))
            .unwrap();
        let contacts = [Contact::new(ContactId(7), DVec2::ZERO, 10.0)];

        engine.set_aim(ship, Some(DVec2::new(1.0, 1.0))).unwrap();
        let events = run(&mut engine, &contacts, 240);
        assert_eq!(
            count(&events, |e| matches!(e, CombatEvent::LockAcquiring { .. })),
            1
        );
        assert_eq!(
            count(&events, |e| matches!(e, CombatEvent::LockAcquired { .. })),
            1
        );
        let lock = engine.status(ship).unwrap().lock;
        assert_eq!(lock.phase, LockPhase::Locked);
        assert!((lock.current_lock_time - 3.0).abs() < 1e-6);

        // Drift into the tolerance band and stay there past the timeout.
        engine.set_aim(ship, Some(DVec2::new(100.0, 0.0))).unwrap();
        let events = run(&mut engine, &contacts, 200);
        assert_eq!(
            count(&events, |e| matches!(e, CombatEvent::LockDegrading { .. })),
            1
        );
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, CombatEvent::LockBroken { .. }))
                .collect::<Vec<_>>(),
            vec![&CombatEvent::LockBroken {
                ship,
                target: ContactId(7),
                reason: LockBreakReason::Degraded
            }]
        );
        assert_eq!(engine.status(ship).unwrap().lock.phase, LockPhase::Idle);
    }

    #[test]
    fn test_clearing_aim_breaks_lock() {
        let mut engine = engine();
        let ship = engine
            .spawn_ship(ShipBlueprint::new(HullClass::Frigate, PostureKind::Deflector))
            .unwrap();
        let contacts = [Contact::new(ContactId(3), DVec2::new(50.0, 50.0), 10.0)];
        engine.set_aim(ship, Some(DVec2::new(50.0, 50.0))).unwrap();
        run(&mut engine, &contacts, 240);

        engine.set_aim(ship, None).unwrap();
        let events = run(&mut engine, &contacts, 5);
        assert_eq!(
            events,
            vec![CombatEvent::LockBroken {
                ship,
                target: ContactId(3),
                reason: LockBreakReason::OutOfTolerance
            }]
        );
    }

    #[test]
    fn test_guided_weapons_home_only_on_a_held_lock() {
        let mut engine = engine();
        let ship = engine
            .spawn_ship(
                ShipBlueprint::new(HullClass::Frigate, PostureKind::Deflector)
                    .with_weapon(WeaponClass::Torpedo, DVec2::ZERO)
                    .with_weapon(WeaponClass::PulseLaser, DVec2::ZERO),
            )
            .unwrap();
        let target = DVec2::new(300.0, 0.0);
        let contacts = [Contact::new(ContactId(11), target, 10.0)];

        engine.queue_command(ShipCommand::Fire { ship, slot: 0, target });
        let out = step(&mut engine, &contacts);
        assert_eq!(out.spawns.len(), 1);
        assert_eq!(out.spawns[0].homing_target, None);

        engine.set_aim(ship, Some(target)).unwrap();
        run(&mut engine, &contacts, 240);
        assert_eq!(engine.status(ship).unwrap().lock.phase, LockPhase::Locked);

        engine.queue_command(ShipCommand::FireAll { ship, target });
        let out = step(&mut engine, &contacts);
        assert_eq!(out.spawns.len(), 2);
        let torpedo = out.spawns.iter().find(|s| s.slot == 0).unwrap();
        let laser = out.spawns.iter().find(|s| s.slot == 1).unwrap();
        assert_eq!(torpedo.homing_target, Some(ContactId(11)));
        assert_eq!(torpedo.kind, ProjectileKind::Missile);
        assert_eq!(laser.homing_target, None);

        let status = engine.status(ship).unwrap();
        assert_eq!(status.weapons[0].loaded, Some(0));
        assert_eq!(status.weapons[0].stored, Some(8));
    }

    #[test]
    fn test_ion_cannon_pays_per_shot() {
        let mut engine = engine();
        let ship = engine
            .spawn_ship(
                ShipBlueprint::new(HullClass::Corvette, PostureKind::Deflector)
                    .with_weapon(WeaponClass::IonCannon, DVec2::ZERO),
            )
            .unwrap();
        engine.queue_command(ShipCommand::Fire {
            ship,
            slot: 0,
            target: DVec2::new(100.0, 0.0),
        });
        let out = step(&mut engine, &[]);
        assert_eq!(out.spawns.len(), 1);
        assert!(out.spawns[0].penetrates_shields);

        let status = engine.status(ship).unwrap();
        assert!((status.reservoir.total_charge - 85.0).abs() < EPS);
        assert_eq!(status.weapons[0].loaded, Some(2));
    }

    #[test]
    fn test_power_mode_reported_in_status() {
        let mut engine = engine();
        let ship = engine
            .spawn_ship(ShipBlueprint::new(HullClass::Frigate, PostureKind::Deflector))
            .unwrap();
        assert_eq!(engine.status(ship).unwrap().power_mode, PowerMode::Balanced);
        engine.set_power_mode(ship, PowerMode::Offensive).unwrap();
        assert_eq!(engine.status(ship).unwrap().power_mode, PowerMode::Offensive);
    }

    #[test]
    fn test_status_serializes_for_hud() {
        let mut engine = engine();
        let ship = engine
            .spawn_ship(
                ShipBlueprint::new(HullClass::Dreadnought, PostureKind::Deflector)
                    .with_weapon(WeaponClass::Autocannon, DVec2::ZERO),
            )
            .unwrap();
        let status = engine.status(ship).unwrap();
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"Autocannon\""));
        assert!(json.contains("\"Dreadnought\""));
        let back: ShipStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);
    }

    // ---- Determinism ----

    fn scripted_run(seed: u64) -> Vec<TickOutput> {
        let mut engine = SimulationEngine::new(SimConfig {
            seed,
            ..Default::default()
        })
        .unwrap();
        let ship = engine
            .spawn_ship(
                ShipBlueprint::new(HullClass::Cruiser, PostureKind::Deflector)
                    .with_weapon(WeaponClass::Flak, DVec2::new(4.0, 2.0))
                    .with_weapon(WeaponClass::Autocannon, DVec2::new(4.0, -2.0)),
            )
            .unwrap();
        (0..300)
            .map(|i| {
                if i % 30 == 0 {
                    engine.queue_command(ShipCommand::FireAll {
                        ship,
                        target: DVec2::new(400.0, 50.0),
                    });
                }
                step(&mut engine, &[])
            })
            .collect()
    }

    #[test]
    fn test_determinism_same_seed() {
        assert_eq!(scripted_run(12345), scripted_run(12345));
    }

    #[test]
    fn test_determinism_different_seeds() {
        assert_ne!(scripted_run(111), scripted_run(222));
    }
}
