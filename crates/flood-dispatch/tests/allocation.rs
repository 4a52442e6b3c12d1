mod support;

use flood_core::{
    ErrorCode, FloodError, RequestStatus, ResourceKind, TeamId, TeamStatus, VehicleStatus,
    now_epoch_millis,
};
use flood_dispatch::allocation::{self, ReleaseOutcome};
use flood_dispatch::{AssignTask, SupplyLine};
use flood_storage::{DispatchStore, RequestRepository};
use support::Harness;

fn plan(team_id: TeamId) -> AssignTask {
    AssignTask {
        team_id,
        vehicle_id: None,
        supplies: Vec::new(),
        note: None,
        emergency_level: None,
    }
}

#[tokio::test]
async fn busy_team_is_rejected_without_side_effects() {
    let h = Harness::new();
    let first = h.submit_verified("First").await;
    let second = h.submit_verified("Second").await;
    let team = h.team("Alpha", None).await;
    let water = h.supply("Water", 10).await;
    h.coordinator
        .assign(first.request_id, plan(team.id), &h.dispatcher)
        .await
        .unwrap();
    let team_before = h.team_now(team.id).await;
    let request_before = h.request(second.request_id).await;

    let err = h
        .coordinator
        .assign(
            second.request_id,
            AssignTask {
                supplies: vec![SupplyLine {
                    supply_id: water.id,
                    quantity: 1,
                }],
                ..plan(team.id)
            },
            &h.dispatcher,
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        FloodError::ResourceUnavailable {
            kind: ResourceKind::Team,
            name: "Alpha".to_string(),
            status: "BUSY".to_string(),
        }
    );
    assert_eq!(h.team_now(team.id).await, team_before);
    assert_eq!(h.request(second.request_id).await, request_before);
    assert_eq!(h.supply_now(water.id).await.quantity, 10);
}

#[tokio::test]
async fn off_duty_team_is_unavailable() {
    let h = Harness::new();
    let receipt = h.submit_verified("Night call").await;
    let team = h.team("Bravo", None).await;
    h.registry
        .set_team_duty(team.id, false, &h.manager)
        .await
        .unwrap();

    let err = h
        .coordinator
        .assign(receipt.request_id, plan(team.id), &h.dispatcher)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ResourceUnavailable);
    assert!(err.to_string().contains("OFF_DUTY"));
    assert_eq!(h.team_now(team.id).await.status, TeamStatus::OffDuty);
    assert_eq!(
        h.request(receipt.request_id).await.status,
        RequestStatus::Verified
    );
}

#[tokio::test]
async fn vehicle_under_maintenance_is_unavailable() {
    let h = Harness::new();
    let receipt = h.submit_verified("Needs a truck").await;
    let team = h.team("Charlie", None).await;
    let truck = h.vehicle("Truck 01").await;
    h.registry
        .change_vehicle_status(truck.id, VehicleStatus::Maintenance, &h.manager)
        .await
        .unwrap();

    let err = h
        .coordinator
        .assign(
            receipt.request_id,
            AssignTask {
                vehicle_id: Some(truck.id),
                ..plan(team.id)
            },
            &h.dispatcher,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ResourceUnavailable);
    assert_eq!(h.team_now(team.id).await.status, TeamStatus::Available);
}

#[tokio::test]
async fn insufficient_stock_rolls_back_the_whole_assignment() {
    let h = Harness::new();
    let receipt = h.submit_verified("Shelter of 40").await;
    let team = h.team("Delta", None).await;
    let boat = h.vehicle("Boat 03").await;
    let water = h.supply("Water", 5).await;
    let blankets = h.supply("Blankets", 1).await;

    let err = h
        .coordinator
        .assign(
            receipt.request_id,
            AssignTask {
                vehicle_id: Some(boat.id),
                supplies: vec![
                    SupplyLine {
                        supply_id: water.id,
                        quantity: 2,
                    },
                    SupplyLine {
                        supply_id: blankets.id,
                        quantity: 4,
                    },
                ],
                ..plan(team.id)
            },
            &h.dispatcher,
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        FloodError::InsufficientStock {
            supply: "Blankets".to_string(),
            requested: 4,
            available: 1,
        }
    );

    assert_eq!(h.team_now(team.id).await.status, TeamStatus::Available);
    let boat = h.vehicle_now(boat.id).await;
    assert_eq!(boat.status, VehicleStatus::Available);
    assert_eq!(boat.current_team_id, None);
    assert_eq!(h.supply_now(water.id).await.quantity, 5);
    assert_eq!(h.supply_now(blankets.id).await.quantity, 1);
    let request = h.request(receipt.request_id).await;
    assert_eq!(request.status, RequestStatus::Verified);
    assert_eq!(request.assigned_team_id, None);
    let ledger = RequestRepository::supply_ledger(&*h.store, receipt.request_id)
        .await
        .unwrap();
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn repeated_lines_are_checked_against_the_running_balance() {
    let h = Harness::new();
    let receipt = h.submit_verified("Two drops").await;
    let team = h.team("Echo", None).await;
    let water = h.supply("Water", 5).await;
    let line = SupplyLine {
        supply_id: water.id,
        quantity: 3,
    };

    let err = h
        .coordinator
        .assign(
            receipt.request_id,
            AssignTask {
                supplies: vec![line, line],
                ..plan(team.id)
            },
            &h.dispatcher,
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        FloodError::InsufficientStock {
            supply: "Water".to_string(),
            requested: 3,
            available: 2,
        }
    );
    assert_eq!(h.supply_now(water.id).await.quantity, 5);
}

#[tokio::test]
async fn zero_quantity_lines_are_invalid() {
    let h = Harness::new();
    let receipt = h.submit_verified("Zero").await;
    let team = h.team("Foxtrot", None).await;
    let water = h.supply("Water", 5).await;

    let err = h
        .coordinator
        .assign(
            receipt.request_id,
            AssignTask {
                supplies: vec![SupplyLine {
                    supply_id: water.id,
                    quantity: 0,
                }],
                ..plan(team.id)
            },
            &h.dispatcher,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidInput);
    assert_eq!(h.team_now(team.id).await.status, TeamStatus::Available);
}

#[tokio::test]
async fn release_twice_matches_release_once() {
    let h = Harness::new();
    let receipt = h.submit_verified("Release me").await;
    let team = h.team("Golf", None).await;
    let canoe = h.vehicle("Canoe 09").await;
    h.coordinator
        .assign(
            receipt.request_id,
            AssignTask {
                vehicle_id: Some(canoe.id),
                ..plan(team.id)
            },
            &h.dispatcher,
        )
        .await
        .unwrap();
    let request = h.request(receipt.request_id).await;

    let mut tx = h.store.begin().await.unwrap();
    let first = allocation::release(tx.as_mut(), &request, now_epoch_millis())
        .await
        .unwrap();
    assert_eq!(
        first,
        ReleaseOutcome {
            team_released: true,
            vehicle_released: true,
        }
    );
    let second = allocation::release(tx.as_mut(), &request, now_epoch_millis())
        .await
        .unwrap();
    assert_eq!(second, ReleaseOutcome::default());
    tx.commit().await.unwrap();

    let team_after = h.team_now(team.id).await;
    let canoe_after = h.vehicle_now(canoe.id).await;
    assert_eq!(team_after.status, TeamStatus::Available);
    assert_eq!(canoe_after.status, VehicleStatus::Available);
    assert_eq!(canoe_after.current_team_id, None);

    let mut tx = h.store.begin().await.unwrap();
    let third = allocation::release(tx.as_mut(), &request, now_epoch_millis())
        .await
        .unwrap();
    assert_eq!(third, ReleaseOutcome::default());
    tx.commit().await.unwrap();
    assert_eq!(h.team_now(team.id).await, team_after);
    assert_eq!(h.vehicle_now(canoe.id).await, canoe_after);
}

#[tokio::test]
async fn reassignment_swaps_resources_in_one_step() {
    let h = Harness::new();
    let receipt = h.submit_verified("Swap teams").await;
    let first = h.team("Hotel", None).await;
    let second = h.team("India", None).await;
    let canoe = h.vehicle("Canoe 10").await;
    h.coordinator
        .assign(
            receipt.request_id,
            AssignTask {
                vehicle_id: Some(canoe.id),
                ..plan(first.id)
            },
            &h.dispatcher,
        )
        .await
        .unwrap();

    let result = h
        .coordinator
        .assign(receipt.request_id, plan(second.id), &h.dispatcher)
        .await
        .unwrap();
    assert_eq!(
        result.released,
        ReleaseOutcome {
            team_released: true,
            vehicle_released: true,
        }
    );
    assert_eq!(h.team_now(first.id).await.status, TeamStatus::Available);
    assert_eq!(h.team_now(second.id).await.status, TeamStatus::Busy);
    assert_eq!(
        h.vehicle_now(canoe.id).await.status,
        VehicleStatus::Available
    );
    let request = h.request(receipt.request_id).await;
    assert_eq!(request.assigned_team_id, Some(second.id));
    assert_eq!(request.assigned_vehicle_id, None);
}

#[tokio::test]
async fn failed_reassignment_keeps_the_original_team() {
    let h = Harness::new();
    let busy_elsewhere = h.submit_verified("Other job").await;
    let receipt = h.submit_verified("Keep team").await;
    let kept = h.team("Juliet", None).await;
    let taken = h.team("Kilo", None).await;
    h.coordinator
        .assign(busy_elsewhere.request_id, plan(taken.id), &h.dispatcher)
        .await
        .unwrap();
    h.coordinator
        .assign(receipt.request_id, plan(kept.id), &h.dispatcher)
        .await
        .unwrap();

    let err = h
        .coordinator
        .assign(receipt.request_id, plan(taken.id), &h.dispatcher)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ResourceUnavailable);
    assert_eq!(h.team_now(kept.id).await.status, TeamStatus::Busy);
    assert_eq!(
        h.request(receipt.request_id).await.assigned_team_id,
        Some(kept.id)
    );
}

#[tokio::test]
async fn completed_requests_cannot_be_reassigned() {
    let h = Harness::new();
    let receipt = h.submit_verified("Done already").await;
    let team = h.team("Lima", None).await;
    h.coordinator
        .assign(receipt.request_id, plan(team.id), &h.dispatcher)
        .await
        .unwrap();
    h.coordinator
        .confirm(
            receipt.request_id,
            flood_dispatch::ConfirmCompletion {
                tracking_code: receipt.tracking_code.clone(),
                feedback: None,
                rating: None,
            },
            None,
        )
        .await
        .unwrap();

    let err = h
        .coordinator
        .assign(receipt.request_id, plan(team.id), &h.dispatcher)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::IllegalTransition);
    assert_eq!(h.team_now(team.id).await.status, TeamStatus::Available);
}

#[tokio::test]
async fn units_consumed_counts_past_a_single_line_limit() {
    let h = Harness::new();
    let receipt = h.submit_verified("Whole district").await;
    let team = h.team("Mike", None).await;
    let rice = h.supply("Rice", u32::MAX).await;
    let water = h.supply("Water", u32::MAX).await;

    let result = h
        .coordinator
        .assign(
            receipt.request_id,
            AssignTask {
                supplies: vec![
                    SupplyLine {
                        supply_id: rice.id,
                        quantity: u32::MAX,
                    },
                    SupplyLine {
                        supply_id: water.id,
                        quantity: 1,
                    },
                ],
                ..plan(team.id)
            },
            &h.dispatcher,
        )
        .await
        .unwrap();

    assert_eq!(result.units_consumed(), u64::from(u32::MAX) + 1);
    assert_eq!(h.supply_now(rice.id).await.quantity, 0);
    assert_eq!(h.supply_now(water.id).await.quantity, u32::MAX - 1);
}

#[tokio::test]
async fn supply_lines_are_drawn_in_id_order() {
    let h = Harness::new();
    let receipt = h.submit_verified("Mixed load").await;
    let team = h.team("November", None).await;
    let mut stock = vec![
        h.supply("Water", 10).await.id,
        h.supply("Rice", 10).await.id,
        h.supply("Blankets", 10).await.id,
    ];
    let mut lines: Vec<SupplyLine> = stock
        .iter()
        .map(|supply_id| SupplyLine {
            supply_id: *supply_id,
            quantity: 1,
        })
        .collect();
    lines.sort_by_key(|line| std::cmp::Reverse(line.supply_id));

    let result = h
        .coordinator
        .assign(
            receipt.request_id,
            AssignTask {
                supplies: lines,
                ..plan(team.id)
            },
            &h.dispatcher,
        )
        .await
        .unwrap();

    stock.sort();
    let drawn: Vec<_> = result.consumed.iter().map(|entry| entry.supply_id).collect();
    assert_eq!(drawn, stock);
}
