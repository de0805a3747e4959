use std::str::FromStr;
use std::sync::Arc;

use expediente_core_api::{
    Actor, CaseState, CreateCaseCommand, EvidenceCommand, OfficeId, Role, UpdateCaseCommand,
    WorkflowError,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::engine::workflow::CaseWorkflowEngine;
use crate::models::audit::{AuditAction, AuditEntityKind, AuditEntryModel};
use crate::models::case::CaseStateCounts;
use crate::models::evidence::EvidenceModel;
use crate::models::transition::CaseTransitionModel;
use crate::repository::case_filter::CaseFilter;
use crate::repository::workflow_store::WorkflowStore;
use crate::store::memory::{InMemoryWorkflowStore, StaticOfficeCatalog};

type TestEngine = CaseWorkflowEngine<InMemoryWorkflowStore, StaticOfficeCatalog>;

const KNOWN_OFFICE: OfficeId = OfficeId(7);

fn new_test_engine() -> TestEngine {
    CaseWorkflowEngine::new(
        InMemoryWorkflowStore::new(),
        StaticOfficeCatalog::new([KNOWN_OFFICE, OfficeId(8)]),
    )
}

fn technician() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Technician)
}

fn coordinator() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Coordinator)
}

fn admin() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Admin)
}

fn new_case_command(code: &str) -> CreateCaseCommand {
    CreateCaseCommand {
        code: code.into(),
        office_id: KNOWN_OFFICE,
        summary: "Allanamiento en zona 10, recolección de indicios".into(),
        document_ref: Some("/informes/acta-001.pdf".into()),
    }
}

fn new_evidence_command(name: &str) -> EvidenceCommand {
    EvidenceCommand {
        name: name.into(),
        description: "Hallado durante el procesamiento de la escena".into(),
        location_in_scene: "Habitación principal, junto a la ventana".into(),
        color: Some("Negro".into()),
        size: Some("Mediano".into()),
        weight: Some(Decimal::from_str("0.85").unwrap()),
    }
}

async fn create_draft_case(engine: &TestEngine, actor: &Actor, code: &str) -> Uuid {
    engine
        .create_case(actor, &new_case_command(code))
        .await
        .expect("case creation should succeed")
}

#[tokio::test]
async fn scenario_a_draft_case_locks_evidence_after_submission() {
    let engine = new_test_engine();
    let tech = technician();

    let case_id = create_draft_case(&engine, &tech, "DICRI-2025-001").await;
    let detail = engine.get_case_detail(&tech, case_id).await.unwrap();
    assert_eq!(detail.case.state, CaseState::Draft);
    assert!(detail.evidence.is_empty());
    assert!(detail.history.is_empty());

    engine
        .add_evidence(&tech, case_id, &new_evidence_command("Arma de fuego calibre 9mm"))
        .await
        .unwrap();
    let detail = engine.get_case_detail(&tech, case_id).await.unwrap();
    assert_eq!(detail.evidence.len(), 1);
    assert_eq!(detail.evidence[0].name.as_str(), "Arma de fuego calibre 9mm");

    let state = engine.request_review(&tech, case_id).await.unwrap();
    assert_eq!(state, CaseState::InReview);

    let err = engine
        .add_evidence(&tech, case_id, &new_evidence_command("Casquillo percutido"))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::CaseNotEditable(id) if id == case_id));

    // The failed add must not have left anything behind.
    let detail = engine.get_case_detail(&tech, case_id).await.unwrap();
    assert_eq!(detail.evidence.len(), 1);
}

#[tokio::test]
async fn scenario_b_technician_cannot_approve() {
    let engine = new_test_engine();
    let tech = technician();

    let case_id = create_draft_case(&engine, &tech, "DICRI-2025-002").await;
    engine.request_review(&tech, case_id).await.unwrap();

    let err = engine.approve(&tech, case_id).await.unwrap_err();
    assert_eq!(err.kind(), "insufficient_role");

    let detail = engine.get_case_detail(&tech, case_id).await.unwrap();
    assert_eq!(detail.case.state, CaseState::InReview);
    assert_eq!(detail.history.len(), 1);
}

#[tokio::test]
async fn scenario_c_reject_requires_justification() {
    let engine = new_test_engine();
    let tech = technician();
    let coord = coordinator();

    let case_id = create_draft_case(&engine, &tech, "DICRI-2025-003").await;
    engine.request_review(&tech, case_id).await.unwrap();

    let err = engine.reject(&coord, case_id, "").await.unwrap_err();
    assert!(matches!(err, WorkflowError::MissingJustification));
    let err = engine.reject(&coord, case_id, "   ").await.unwrap_err();
    assert!(matches!(err, WorkflowError::MissingJustification));

    let state = engine.reject(&coord, case_id, "Falta peritaje").await.unwrap();
    assert_eq!(state, CaseState::Rejected);

    let detail = engine.get_case_detail(&tech, case_id).await.unwrap();
    assert_eq!(detail.case.state, CaseState::Rejected);
    assert_eq!(detail.history.len(), 2);
    let rejection = &detail.history[1];
    assert_eq!(rejection.from_state, CaseState::InReview);
    assert_eq!(rejection.to_state, CaseState::Rejected);
    assert_eq!(rejection.justification.as_deref(), Some("Falta peritaje"));
    assert_eq!(rejection.actor_role, Role::Coordinator);
}

#[tokio::test]
async fn missing_justification_wins_over_insufficient_role() {
    let engine = new_test_engine();
    let tech = technician();

    let case_id = create_draft_case(&engine, &tech, "DICRI-2025-004").await;
    engine.request_review(&tech, case_id).await.unwrap();

    // An empty justification fails first no matter who asks.
    for actor in [technician(), coordinator(), admin()] {
        let err = engine.reject(&actor, case_id, "").await.unwrap_err();
        assert!(matches!(err, WorkflowError::MissingJustification));
    }

    // With a justification, the role check takes over for non-coordinators.
    let err = engine.reject(&tech, case_id, "Falta peritaje").await.unwrap_err();
    assert_eq!(err.kind(), "insufficient_role");
}

#[tokio::test]
async fn scenario_d_rejected_case_can_be_resubmitted_and_approved() {
    let engine = new_test_engine();
    let tech = technician();
    let coord = coordinator();

    let case_id = create_draft_case(&engine, &tech, "DICRI-2025-005").await;
    engine.request_review(&tech, case_id).await.unwrap();
    engine.reject(&coord, case_id, "Falta peritaje").await.unwrap();

    let state = engine.request_review(&tech, case_id).await.unwrap();
    assert_eq!(state, CaseState::InReview);

    let state = engine.approve(&coord, case_id).await.unwrap();
    assert_eq!(state, CaseState::Approved);

    // Approved is terminal.
    let err = engine.approve(&coord, case_id).await.unwrap_err();
    assert_eq!(err.kind(), "invalid_transition");
    let err = engine.reject(&coord, case_id, "Tarde").await.unwrap_err();
    assert_eq!(err.kind(), "invalid_transition");
    let err = engine.request_review(&tech, case_id).await.unwrap_err();
    assert_eq!(err.kind(), "invalid_transition");
}

#[tokio::test]
async fn review_actions_fail_outside_in_review() {
    let engine = new_test_engine();
    let tech = technician();
    let coord = coordinator();

    let case_id = create_draft_case(&engine, &tech, "DICRI-2025-006").await;

    let err = engine.approve(&coord, case_id).await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::InvalidTransition { from: CaseState::Draft, to: CaseState::Approved }
    ));
    let err = engine.reject(&coord, case_id, "Sin revisión").await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::InvalidTransition { from: CaseState::Draft, to: CaseState::Rejected }
    ));

    // Submitting an already submitted case is equally invalid.
    engine.request_review(&tech, case_id).await.unwrap();
    let err = engine.request_review(&tech, case_id).await.unwrap_err();
    assert_eq!(err.kind(), "invalid_transition");
}

#[tokio::test]
async fn scenario_e_exactly_one_winner_between_concurrent_approvals() {
    let engine = Arc::new(new_test_engine());
    let tech = technician();

    let case_id = create_draft_case(&engine, &tech, "DICRI-2025-007").await;
    engine.request_review(&tech, case_id).await.unwrap();

    let first = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.approve(&coordinator(), case_id).await })
    };
    let second = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.approve(&coordinator(), case_id).await })
    };
    let outcomes = [first.await.unwrap(), second.await.unwrap()];

    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one approval must win");
    let loser = outcomes.iter().find(|r| r.is_err()).unwrap();
    let kind = loser.as_ref().unwrap_err().kind();
    assert!(
        kind == "concurrent_modification" || kind == "invalid_transition",
        "loser saw {kind}"
    );

    let detail = engine.get_case_detail(&tech, case_id).await.unwrap();
    assert_eq!(detail.case.state, CaseState::Approved);
    assert_eq!(detail.history.len(), 2, "submission plus one approval");
}

#[tokio::test]
async fn stale_version_commit_is_a_concurrent_modification() {
    let engine = new_test_engine();
    let tech = technician();
    let coord = coordinator();

    let case_id = create_draft_case(&engine, &tech, "DICRI-2025-008").await;
    engine.request_review(&tech, case_id).await.unwrap();

    // Snapshot the case as a slow competing transaction would have.
    let stale = engine.store().load_case(case_id).await.unwrap().unwrap();

    engine.approve(&coord, case_id).await.unwrap();

    // Replay the competing reject against the now-stale version.
    let mut updated = stale.clone();
    updated.state = CaseState::Rejected;
    updated.version = stale.version + 1;
    let record = CaseTransitionModel {
        id: Uuid::new_v4(),
        case_id,
        from_state: stale.state,
        to_state: CaseState::Rejected,
        justification: None,
        actor_id: coord.actor_id,
        actor_role: coord.role,
        recorded_at: chrono::Utc::now(),
    };
    let audit = AuditEntryModel::new(
        AuditEntityKind::Case,
        case_id,
        AuditAction::Transition,
        &coord,
        None,
        None,
    );
    let err = engine
        .store()
        .commit_transition(&updated, stale.version, &record, &audit)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::ConcurrentModification(id) if id == case_id));

    let detail = engine.get_case_detail(&tech, case_id).await.unwrap();
    assert_eq!(detail.case.state, CaseState::Approved);
    assert_eq!(detail.history.len(), 2);
}

#[tokio::test]
async fn duplicate_code_is_rejected_and_fresh_codes_are_not() {
    let engine = new_test_engine();
    let tech = technician();

    create_draft_case(&engine, &tech, "DICRI-2025-010").await;
    let err = engine
        .create_case(&tech, &new_case_command("DICRI-2025-010"))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::DuplicateCode(code) if code == "DICRI-2025-010"));

    // A genuinely unused code never trips the uniqueness check.
    create_draft_case(&engine, &tech, "DICRI-2025-011").await;
}

#[tokio::test]
async fn unknown_office_fails_creation() {
    let engine = new_test_engine();
    let tech = technician();

    let mut command = new_case_command("DICRI-2025-012");
    command.office_id = OfficeId(999);
    let err = engine.create_case(&tech, &command).await.unwrap_err();
    assert!(matches!(err, WorkflowError::UnknownOffice(OfficeId(999))));
}

#[tokio::test]
async fn only_technicians_create_cases() {
    let engine = new_test_engine();
    for actor in [coordinator(), admin()] {
        let err = engine
            .create_case(&actor, &new_case_command("DICRI-2025-013"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "insufficient_role");
    }
}

#[tokio::test]
async fn case_updates_follow_editability() {
    let engine = new_test_engine();
    let tech = technician();
    let coord = coordinator();

    let case_id = create_draft_case(&engine, &tech, "DICRI-2025-014").await;
    let update = UpdateCaseCommand {
        office_id: OfficeId(8),
        summary: "Allanamiento ampliado a la vivienda contigua".into(),
        document_ref: None,
    };

    // Draft: editable.
    engine.update_case(&tech, case_id, &update).await.unwrap();
    let detail = engine.get_case_detail(&tech, case_id).await.unwrap();
    assert_eq!(detail.case.office_id, OfficeId(8));
    assert_eq!(detail.case.document_ref, None);

    // In review: locked.
    engine.request_review(&tech, case_id).await.unwrap();
    let err = engine.update_case(&tech, case_id, &update).await.unwrap_err();
    assert_eq!(err.kind(), "case_not_editable");

    // Rejected: editable again, and the edit does not move the state.
    engine.reject(&coord, case_id, "Completar datos").await.unwrap();
    engine.update_case(&tech, case_id, &update).await.unwrap();
    let detail = engine.get_case_detail(&tech, case_id).await.unwrap();
    assert_eq!(detail.case.state, CaseState::Rejected);
    assert_eq!(detail.history.len(), 2, "field edits never record transitions");

    // The case code is immutable by construction: the update payload
    // simply has no code field, and the stored code is untouched.
    assert_eq!(detail.case.code.as_str(), "DICRI-2025-014");
}

#[tokio::test]
async fn evidence_mutations_require_draft() {
    let engine = new_test_engine();
    let tech = technician();
    let coord = coordinator();

    let case_id = create_draft_case(&engine, &tech, "DICRI-2025-015").await;
    let evidence_id = engine
        .add_evidence(&tech, case_id, &new_evidence_command("Cuchillo"))
        .await
        .unwrap();

    engine.request_review(&tech, case_id).await.unwrap();

    let err = engine
        .update_evidence(&tech, evidence_id, &new_evidence_command("Cuchillo de cocina"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "case_not_editable");
    let err = engine.delete_evidence(&tech, evidence_id).await.unwrap_err();
    assert_eq!(err.kind(), "case_not_editable");

    // Rejected is editable for case fields but NOT for evidence.
    engine.reject(&coord, case_id, "Revisar cadena de custodia").await.unwrap();
    let err = engine
        .add_evidence(&tech, case_id, &new_evidence_command("Otro indicio"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "case_not_editable");
}

fn staged_evidence(case_id: Uuid, actor: &Actor, name: &str) -> EvidenceModel {
    let now = chrono::Utc::now();
    EvidenceModel {
        id: Uuid::new_v4(),
        case_id,
        name: name.try_into().unwrap(),
        description: "Hallado durante el procesamiento de la escena"
            .try_into()
            .unwrap(),
        location_in_scene: "Habitación principal".try_into().unwrap(),
        color: None,
        size: None,
        weight: None,
        created_by: actor.actor_id,
        created_at: now,
        updated_by: actor.actor_id,
        updated_at: now,
    }
}

#[tokio::test]
async fn in_flight_evidence_writes_lose_to_a_committed_transition() {
    let engine = new_test_engine();
    let tech = technician();

    let case_id = create_draft_case(&engine, &tech, "DICRI-2025-022").await;
    let evidence_id = engine
        .add_evidence(&tech, case_id, &new_evidence_command("Cuchillo"))
        .await
        .unwrap();

    // Racers that loaded the case in DRAFT and passed the engine's
    // pre-check, but whose store writes land after the transition commits.
    let staged = staged_evidence(case_id, &tech, "Casquillo percutido");
    let mut revised = engine
        .store()
        .load_evidence(evidence_id)
        .await
        .unwrap()
        .unwrap();
    revised.name = "Cuchillo de cocina".try_into().unwrap();

    engine.request_review(&tech, case_id).await.unwrap();

    // The store re-asserts DRAFT inside its own commit, so each write
    // fails instead of partially applying.
    let audit = AuditEntryModel::new(
        AuditEntityKind::Evidence,
        staged.id,
        AuditAction::Create,
        &tech,
        None,
        None,
    );
    let err = engine
        .store()
        .insert_evidence(&staged, &audit)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::CaseNotEditable(id) if id == case_id));

    let audit = AuditEntryModel::new(
        AuditEntityKind::Evidence,
        revised.id,
        AuditAction::Update,
        &tech,
        None,
        None,
    );
    let err = engine
        .store()
        .update_evidence(&revised, &audit)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::CaseNotEditable(id) if id == case_id));

    let audit = AuditEntryModel::new(
        AuditEntityKind::Evidence,
        evidence_id,
        AuditAction::Delete,
        &tech,
        None,
        None,
    );
    let err = engine
        .store()
        .delete_evidence(evidence_id, case_id, &audit)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::CaseNotEditable(id) if id == case_id));

    // Nothing landed: the original item is untouched, the staged item does
    // not exist, and no audit entries rode the failed writes.
    let detail = engine.get_case_detail(&tech, case_id).await.unwrap();
    assert_eq!(detail.evidence.len(), 1);
    assert_eq!(detail.evidence[0].name.as_str(), "Cuchillo");
    assert!(engine.store().load_evidence(staged.id).await.unwrap().is_none());
    let trail = engine
        .store()
        .load_audit_trail(AuditEntityKind::Evidence, evidence_id)
        .await
        .unwrap();
    assert_eq!(trail.len(), 1, "only the original creation is on record");
}

#[tokio::test]
async fn evidence_update_and_delete_in_draft() {
    let engine = new_test_engine();
    let tech = technician();

    let case_id = create_draft_case(&engine, &tech, "DICRI-2025-016").await;
    let evidence_id = engine
        .add_evidence(&tech, case_id, &new_evidence_command("Documento quemado"))
        .await
        .unwrap();

    let mut revised = new_evidence_command("Documento parcialmente quemado");
    revised.weight = None;
    engine.update_evidence(&tech, evidence_id, &revised).await.unwrap();

    let detail = engine.get_case_detail(&tech, case_id).await.unwrap();
    assert_eq!(detail.evidence[0].name.as_str(), "Documento parcialmente quemado");
    assert_eq!(detail.evidence[0].weight, None);

    engine.delete_evidence(&tech, evidence_id).await.unwrap();
    let detail = engine.get_case_detail(&tech, case_id).await.unwrap();
    assert!(detail.evidence.is_empty());

    let err = engine.delete_evidence(&tech, evidence_id).await.unwrap_err();
    assert_eq!(err.kind(), "evidence_not_found");
}

#[tokio::test]
async fn invalid_evidence_data_never_reaches_storage() {
    let engine = new_test_engine();
    let tech = technician();

    let case_id = create_draft_case(&engine, &tech, "DICRI-2025-017").await;

    let mut command = new_evidence_command("Indicio");
    command.name.clear();
    let err = engine.add_evidence(&tech, case_id, &command).await.unwrap_err();
    assert_eq!(err.kind(), "validation_error");

    let mut command = new_evidence_command("Indicio");
    command.weight = Some(Decimal::from_str("-1").unwrap());
    let err = engine.add_evidence(&tech, case_id, &command).await.unwrap_err();
    assert_eq!(err.kind(), "validation_error");

    let detail = engine.get_case_detail(&tech, case_id).await.unwrap();
    assert!(detail.evidence.is_empty());
}

#[tokio::test]
async fn missing_entities_yield_not_found() {
    let engine = new_test_engine();
    let tech = technician();

    let ghost = Uuid::new_v4();
    assert_eq!(
        engine.get_case_detail(&tech, ghost).await.unwrap_err().kind(),
        "case_not_found"
    );
    assert_eq!(
        engine.request_review(&tech, ghost).await.unwrap_err().kind(),
        "case_not_found"
    );
    assert_eq!(
        engine
            .add_evidence(&tech, ghost, &new_evidence_command("Indicio"))
            .await
            .unwrap_err()
            .kind(),
        "case_not_found"
    );
    assert_eq!(
        engine
            .update_evidence(&tech, ghost, &new_evidence_command("Indicio"))
            .await
            .unwrap_err()
            .kind(),
        "evidence_not_found"
    );
}

#[tokio::test]
async fn change_state_maps_target_codes_onto_actions() {
    let engine = new_test_engine();
    let tech = technician();
    let coord = coordinator();

    let case_id = create_draft_case(&engine, &tech, "DICRI-2025-018").await;

    let state = engine
        .change_state(&tech, case_id, CaseState::InReview, None)
        .await
        .unwrap();
    assert_eq!(state, CaseState::InReview);

    let err = engine
        .change_state(&coord, case_id, CaseState::Draft, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::InvalidTransition { from: CaseState::InReview, to: CaseState::Draft }
    ));

    let state = engine
        .change_state(&coord, case_id, CaseState::Approved, None)
        .await
        .unwrap();
    assert_eq!(state, CaseState::Approved);
}

#[tokio::test]
async fn replaying_the_history_reconstructs_the_state() {
    let engine = new_test_engine();
    let tech = technician();
    let coord = coordinator();

    let case_id = create_draft_case(&engine, &tech, "DICRI-2025-019").await;
    engine.request_review(&tech, case_id).await.unwrap();
    engine.reject(&coord, case_id, "Falta peritaje").await.unwrap();
    engine.request_review(&tech, case_id).await.unwrap();
    engine.approve(&coord, case_id).await.unwrap();

    let detail = engine.get_case_detail(&tech, case_id).await.unwrap();
    assert_eq!(detail.history.len(), 4, "one record per successful transition");

    let mut replayed = CaseState::Draft;
    for record in &detail.history {
        assert_eq!(record.from_state, replayed, "records chain without gaps");
        replayed = record.to_state;
    }
    assert_eq!(replayed, detail.case.state);
}

#[tokio::test]
async fn audit_trail_documents_every_mutation() {
    let engine = new_test_engine();
    let tech = technician();
    let coord = coordinator();

    let case_id = create_draft_case(&engine, &tech, "DICRI-2025-020").await;
    let evidence_id = engine
        .add_evidence(&tech, case_id, &new_evidence_command("Bala deformada"))
        .await
        .unwrap();
    engine
        .update_evidence(&tech, evidence_id, &new_evidence_command("Proyectil deformado"))
        .await
        .unwrap();
    engine.delete_evidence(&tech, evidence_id).await.unwrap();
    engine.request_review(&tech, case_id).await.unwrap();
    engine.approve(&coord, case_id).await.unwrap();

    let case_trail = engine
        .store()
        .load_audit_trail(AuditEntityKind::Case, case_id)
        .await
        .unwrap();
    let case_actions: Vec<AuditAction> = case_trail.iter().map(|e| e.action).collect();
    assert_eq!(
        case_actions,
        [AuditAction::Create, AuditAction::Transition, AuditAction::Transition]
    );
    assert!(case_trail[0].before.is_none());
    assert!(case_trail[0].after.is_some());
    assert_eq!(case_trail[0].actor_id, tech.actor_id);
    assert_eq!(case_trail[2].actor_role, Role::Coordinator);

    let evidence_trail = engine
        .store()
        .load_audit_trail(AuditEntityKind::Evidence, evidence_id)
        .await
        .unwrap();
    let evidence_actions: Vec<AuditAction> = evidence_trail.iter().map(|e| e.action).collect();
    assert_eq!(
        evidence_actions,
        [AuditAction::Create, AuditAction::Update, AuditAction::Delete]
    );
    // The delete entry keeps the before-image as the permanent record.
    assert!(evidence_trail[2].before.is_some());
    assert!(evidence_trail[2].after.is_none());
    // Updates carry both images.
    assert!(evidence_trail[1].before.is_some());
    assert!(evidence_trail[1].after.is_some());
}

#[tokio::test]
async fn denied_and_invalid_calls_leave_no_audit_entries() {
    let engine = new_test_engine();
    let tech = technician();
    let coord = coordinator();

    let case_id = create_draft_case(&engine, &tech, "DICRI-2025-021").await;
    engine.approve(&coord, case_id).await.unwrap_err();
    engine.reject(&coord, case_id, "").await.unwrap_err();
    engine
        .add_evidence(&coord, case_id, &new_evidence_command("Indicio"))
        .await
        .unwrap_err();

    let trail = engine
        .store()
        .load_audit_trail(AuditEntityKind::Case, case_id)
        .await
        .unwrap();
    assert_eq!(trail.len(), 1, "only the creation is on record");
}

#[tokio::test]
async fn listing_is_filtered_and_stably_ordered() {
    let engine = new_test_engine();
    let tech = technician();

    let first = create_draft_case(&engine, &tech, "DICRI-2025-030").await;
    let second = create_draft_case(&engine, &tech, "DICRI-2025-031").await;
    let third = create_draft_case(&engine, &tech, "MP-2024-099").await;
    engine.request_review(&tech, second).await.unwrap();

    let all = engine.list_cases(&tech, &CaseFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    let mut expected: Vec<_> = all.iter().map(|c| (c.created_at, c.id)).collect();
    expected.sort();
    let actual: Vec<_> = all.iter().map(|c| (c.created_at, c.id)).collect();
    assert_eq!(actual, expected, "creation time ascending, ties by id");

    let drafts = engine
        .list_cases(&tech, &CaseFilter::default().with_state(CaseState::Draft))
        .await
        .unwrap();
    assert_eq!(drafts.len(), 2);
    assert!(drafts.iter().all(|c| c.state == CaseState::Draft));

    let dicri = engine
        .list_cases(&tech, &CaseFilter::default().with_code_contains("DICRI"))
        .await
        .unwrap();
    assert_eq!(dicri.len(), 2);

    // Date bounds are inclusive on both ends.
    let first_created = all.iter().find(|c| c.id == first).unwrap().created_at;
    let only_first = engine
        .list_cases(
            &tech,
            &CaseFilter::default()
                .created_from(first_created)
                .created_to(first_created),
        )
        .await
        .unwrap();
    assert_eq!(only_first.len(), 1);
    assert_eq!(only_first[0].id, first);

    let none = engine
        .list_cases(
            &tech,
            &CaseFilter::default()
                .with_state(CaseState::InReview)
                .with_code_contains("MP"),
        )
        .await
        .unwrap();
    assert!(none.is_empty(), "conjunctive filters; empty result is not an error");
    let _ = third;
}

#[tokio::test]
async fn counts_cover_all_states_including_zeroes() {
    let engine = new_test_engine();
    let tech = technician();
    let coord = coordinator();

    assert_eq!(
        engine.count_by_state(&coord).await.unwrap(),
        CaseStateCounts::default()
    );

    create_draft_case(&engine, &tech, "DICRI-2025-040").await;
    let submitted = create_draft_case(&engine, &tech, "DICRI-2025-041").await;
    engine.request_review(&tech, submitted).await.unwrap();

    let counts = engine.count_by_state(&coord).await.unwrap();
    assert_eq!(counts.draft, 1);
    assert_eq!(counts.in_review, 1);
    assert_eq!(counts.approved, 0);
    assert_eq!(counts.rejected, 0);
    assert_eq!(counts.total(), 2);

    // Counts are for coordinators and admins only.
    assert_eq!(
        engine.count_by_state(&tech).await.unwrap_err().kind(),
        "insufficient_role"
    );
    engine.count_by_state(&admin()).await.unwrap();

    // Admins hold no read access to listings or details.
    assert_eq!(
        engine
            .list_cases(&admin(), &CaseFilter::default())
            .await
            .unwrap_err()
            .kind(),
        "insufficient_role"
    );
}
