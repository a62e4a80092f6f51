//! Registration engine: validates a request against an event snapshot.
//!
//! [`register_participant`] is pure: it reads the event, the requesting
//! user and the parsed request, and either returns the record to append
//! or the first rule that failed. [`apply_registration`] runs it and, on
//! success only, appends the record to the snapshot.
//!
//! Rules run in a fixed order and the first failure wins:
//!
//! 1. eligibility (status, open switch, deadline)
//! 2. duplicate active registration
//! 3. participation mode
//! 4. declarations
//! 5. leader profile
//! 6. team name, size, member profiles, email uniqueness
//! 7. capacity

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::event::{Event, EventStatus, ParticipationMode};
use super::profile::{resolve_leader_profile, resolve_member_profile, validate_profile};
use super::projection::count_active_participants;
use super::registration::{ParticipantProfile, Registration, RegistrationStatus, RegistrationType};
use super::rejection::RegistrationRejection;
use super::request::RegistrationRequest;
use super::user::RequestingUser;

const MIN_TEAM_NAME_CHARS: usize = 2;

/// Validates `request` against `event` and builds the record to commit.
///
/// # Errors
///
/// Returns the [`RegistrationRejection`] of the first rule that fails.
pub fn register_participant(
    event: &Event,
    user: &RequestingUser,
    request: &RegistrationRequest,
    now: DateTime<Utc>,
) -> Result<Registration, RegistrationRejection> {
    check_eligibility(event, now)?;

    if event.active_registration_of(user.id).is_some() {
        return Err(RegistrationRejection::AlreadyRegistered);
    }

    let registration_type =
        resolve_registration_type(event.registration.participation_mode, request)?;

    let declarations = request.declarations();
    if !declarations.all_accepted() {
        return Err(RegistrationRejection::DeclarationsIncomplete);
    }

    let leader_label = match registration_type {
        RegistrationType::Team => "Team leader",
        RegistrationType::Individual => "Participant",
    };
    let leader = resolve_leader_profile(request.participant_profile.as_ref(), user);
    validate_profile(&leader, leader_label)?;

    let (team_name, team_members) = match registration_type {
        RegistrationType::Team => {
            let (name, members) = validate_team(event, request, &leader)?;
            (Some(name), members)
        }
        RegistrationType::Individual => (None, Vec::new()),
    };

    let head_count = u32::try_from(team_members.len())
        .unwrap_or(u32::MAX)
        .saturating_add(1);
    check_capacity(event, head_count)?;

    Ok(Registration {
        student_id: user.id,
        status: RegistrationStatus::Registered,
        registration_type,
        team_name,
        head_count,
        participant_profile: leader,
        team_members,
        declarations,
        registered_at: now,
    })
}

/// Runs [`register_participant`] and appends the accepted record to `event`.
///
/// `event` is left untouched when the request is rejected.
///
/// # Errors
///
/// Returns the [`RegistrationRejection`] of the first rule that fails.
pub fn apply_registration(
    event: &mut Event,
    user: &RequestingUser,
    request: &RegistrationRequest,
    now: DateTime<Utc>,
) -> Result<Registration, RegistrationRejection> {
    let registration = register_participant(event, user, request, now)?;
    event.append_registration(registration.clone());
    Ok(registration)
}

fn check_eligibility(event: &Event, now: DateTime<Utc>) -> Result<(), RegistrationRejection> {
    if event.status != EventStatus::Published {
        return Err(RegistrationRejection::NotPublished);
    }
    if !event.registration.is_open {
        return Err(RegistrationRejection::RegistrationClosed);
    }
    if let Some(last_date) = event.registration.last_date
        && now > last_date
    {
        return Err(RegistrationRejection::DeadlinePassed(last_date));
    }
    Ok(())
}

fn resolve_registration_type(
    mode: ParticipationMode,
    request: &RegistrationRequest,
) -> Result<RegistrationType, RegistrationRejection> {
    let requested = request.registration_type.unwrap_or(match mode {
        ParticipationMode::Team => RegistrationType::Team,
        ParticipationMode::Individual | ParticipationMode::Both => RegistrationType::Individual,
    });

    match (mode, requested) {
        (ParticipationMode::Individual, RegistrationType::Team) => {
            Err(RegistrationRejection::ModeMismatch(
                "This event only accepts individual registrations".to_string(),
            ))
        }
        (ParticipationMode::Team, RegistrationType::Individual) => {
            Err(RegistrationRejection::ModeMismatch(
                "This event only accepts team registrations".to_string(),
            ))
        }
        _ => Ok(requested),
    }
}

fn validate_team(
    event: &Event,
    request: &RegistrationRequest,
    leader: &ParticipantProfile,
) -> Result<(String, Vec<ParticipantProfile>), RegistrationRejection> {
    let team_name = request
        .team_name
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    if team_name.chars().count() < MIN_TEAM_NAME_CHARS {
        return Err(RegistrationRejection::InvalidTeamName);
    }

    let max_additional = event.registration.max_additional_members();
    let submitted = request.team_members.as_deref().unwrap_or_default();
    if submitted.is_empty() {
        return Err(RegistrationRejection::NoTeamMembers);
    }
    if submitted.len() > max_additional {
        return Err(RegistrationRejection::TeamTooLarge { max_additional });
    }

    let mut members = Vec::with_capacity(submitted.len());
    for (index, input) in submitted.iter().enumerate() {
        let member = resolve_member_profile(input);
        validate_profile(&member, &format!("Team member {}", index + 1))?;
        members.push(member);
    }

    let mut seen = HashSet::with_capacity(members.len() + 1);
    for email in std::iter::once(&leader.email).chain(members.iter().map(|m| &m.email)) {
        if !seen.insert(email.as_str()) {
            return Err(RegistrationRejection::DuplicateTeamEmail(email.clone()));
        }
    }

    Ok((team_name, members))
}

fn check_capacity(event: &Event, head_count: u32) -> Result<(), RegistrationRejection> {
    let Some(capacity) = event.registration.capacity() else {
        return Ok(());
    };
    let taken = count_active_participants(event.participants());
    let requested = u64::from(head_count);
    if taken.saturating_add(requested) > capacity {
        return Err(RegistrationRejection::EventFull {
            capacity,
            remaining: capacity.saturating_sub(taken),
            requested,
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::event::{EventDraft, RegistrationConfig, RegistrationConfigPatch};
    use crate::error::CampusError;
    use crate::domain::user::{AcademicProfile, UserRole};
    use crate::domain::UserId;
    use chrono::Duration;
    use serde_json::json;

    fn student(n: u32) -> RequestingUser {
        RequestingUser {
            id: UserId::new(),
            role: UserRole::Student,
            full_name: format!("Student Number {n}"),
            email: format!("student{n}@college.edu"),
            mobile_number: "9876543210".to_string(),
            college_name: "City College".to_string(),
            academic_profile: AcademicProfile {
                branch: "CSE".to_string(),
                year: "3".to_string(),
            },
        }
    }

    fn published(config: RegistrationConfig) -> Event {
        let Ok(mut event) = Event::create(
            UserId::new(),
            EventDraft {
                title: "Code Sprint".to_string(),
                description: String::new(),
                venue: None,
                starts_at: None,
                registration: config,
            },
        ) else {
            panic!("valid draft");
        };
        let Ok(()) = event.transition_to(EventStatus::Published) else {
            panic!("draft can be published");
        };
        event
    }

    fn team_config(max_team_members: u32) -> RegistrationConfig {
        RegistrationConfig {
            participation_mode: ParticipationMode::Team,
            max_team_members,
            ..RegistrationConfig::default()
        }
    }

    fn request(value: serde_json::Value) -> RegistrationRequest {
        let Ok(req) = RegistrationRequest::from_json(value) else {
            panic!("test payload should parse");
        };
        req
    }

    fn individual() -> RegistrationRequest {
        request(json!({
            "declarations": { "studentAuthenticity": true, "certificateAwareness": true }
        }))
    }

    fn member(name: &str, email: &str) -> serde_json::Value {
        json!({
            "fullName": name,
            "email": email,
            "mobileNumber": "8123456789",
            "collegeName": "City College",
            "branch": "IT",
            "year": 2
        })
    }

    fn team(members: Vec<serde_json::Value>) -> RegistrationRequest {
        request(json!({
            "registrationType": "TEAM",
            "teamName": "Null Pointers",
            "declarations": { "studentAuthenticity": true, "certificateAwareness": true },
            "teamMembers": members
        }))
    }

    #[test]
    fn scenario_individual_capacity_and_duplicates() {
        let mut event = published(RegistrationConfig {
            max_participants: Some(2),
            ..RegistrationConfig::default()
        });
        let (s1, s2, s3) = (student(1), student(2), student(3));
        let now = Utc::now();

        assert!(apply_registration(&mut event, &s1, &individual(), now).is_ok());
        assert_eq!(count_active_participants(event.participants()), 1);

        assert_eq!(
            apply_registration(&mut event, &s1, &individual(), now),
            Err(RegistrationRejection::AlreadyRegistered)
        );
        assert_eq!(event.participants().len(), 1);

        assert!(apply_registration(&mut event, &s2, &individual(), now).is_ok());
        assert_eq!(count_active_participants(event.participants()), 2);

        assert!(matches!(
            apply_registration(&mut event, &s3, &individual(), now),
            Err(RegistrationRejection::EventFull { remaining: 0, .. })
        ));
        assert_eq!(event.participants().len(), 2);
    }

    #[test]
    fn scenario_team_size_bounds() {
        let event = published(team_config(3));
        let leader = student(1);
        let now = Utc::now();

        let too_many = team(vec![
            member("Member One", "m1@x.com"),
            member("Member Two", "m2@x.com"),
            member("Member Three", "m3@x.com"),
        ]);
        assert_eq!(
            register_participant(&event, &leader, &too_many, now),
            Err(RegistrationRejection::TeamTooLarge { max_additional: 2 })
        );

        assert_eq!(
            register_participant(&event, &leader, &team(vec![]), now),
            Err(RegistrationRejection::NoTeamMembers)
        );

        let ok = team(vec![
            member("Member One", "m1@x.com"),
            member("Member Two", "m2@x.com"),
        ]);
        let Ok(record) = register_participant(&event, &leader, &ok, now) else {
            panic!("valid team should register");
        };
        assert_eq!(record.head_count, 3);
        assert_eq!(record.registration_type, RegistrationType::Team);
        assert_eq!(record.team_name.as_deref(), Some("Null Pointers"));
        assert_eq!(record.team_members.len(), 2);
    }

    #[test]
    fn scenario_deadline_passed_wins_over_everything() {
        let yesterday = Utc::now() - Duration::days(1);
        let event = published(RegistrationConfig {
            last_date: Some(yesterday),
            ..RegistrationConfig::default()
        });
        let garbage = request(json!({ "registrationType": "TEAM" }));
        assert_eq!(
            register_participant(&event, &student(1), &garbage, Utc::now()),
            Err(RegistrationRejection::DeadlinePassed(yesterday))
        );
    }

    #[test]
    fn deadline_instant_itself_is_accepted() {
        let deadline = Utc::now();
        let event = published(RegistrationConfig {
            last_date: Some(deadline),
            ..RegistrationConfig::default()
        });
        assert!(register_participant(&event, &student(1), &individual(), deadline).is_ok());
    }

    #[test]
    fn scenario_duplicate_team_email_is_case_insensitive() {
        let event = published(team_config(4));
        let mut leader = student(1);
        leader.email = "A@x.com".to_string();
        let req = team(vec![member("Member One", "a@X.com")]);
        assert_eq!(
            register_participant(&event, &leader, &req, Utc::now()),
            Err(RegistrationRejection::DuplicateTeamEmail("a@x.com".to_string()))
        );
    }

    #[test]
    fn duplicate_between_members_is_detected() {
        let event = published(team_config(4));
        let req = team(vec![
            member("Member One", "same@x.com"),
            member("Member Two", "SAME@x.com"),
        ]);
        assert!(matches!(
            register_participant(&event, &student(1), &req, Utc::now()),
            Err(RegistrationRejection::DuplicateTeamEmail(_))
        ));
    }

    #[test]
    fn scenario_declarations_incomplete() {
        let event = published(RegistrationConfig::default());
        let req = request(json!({
            "declarations": { "studentAuthenticity": true, "certificateAwareness": false }
        }));
        assert_eq!(
            register_participant(&event, &student(1), &req, Utc::now()),
            Err(RegistrationRejection::DeclarationsIncomplete)
        );
    }

    #[test]
    fn eligibility_gate_order() {
        let mut event = published(RegistrationConfig::default());
        event.status = EventStatus::Draft;
        assert_eq!(
            register_participant(&event, &student(1), &individual(), Utc::now()),
            Err(RegistrationRejection::NotPublished)
        );

        event.status = EventStatus::Published;
        event.registration.is_open = false;
        assert_eq!(
            register_participant(&event, &student(1), &individual(), Utc::now()),
            Err(RegistrationRejection::RegistrationClosed)
        );
    }

    #[test]
    fn mode_enforcement() {
        let individual_only = published(RegistrationConfig::default());
        let team_req = team(vec![member("Member One", "m1@x.com")]);
        assert!(matches!(
            register_participant(&individual_only, &student(1), &team_req, Utc::now()),
            Err(RegistrationRejection::ModeMismatch(_))
        ));

        let team_only = published(team_config(4));
        let explicit_individual = request(json!({
            "registrationType": "INDIVIDUAL",
            "declarations": { "studentAuthenticity": true, "certificateAwareness": true }
        }));
        assert!(matches!(
            register_participant(&team_only, &student(1), &explicit_individual, Utc::now()),
            Err(RegistrationRejection::ModeMismatch(_))
        ));

        let both = published(RegistrationConfig {
            participation_mode: ParticipationMode::Both,
            ..RegistrationConfig::default()
        });
        let Ok(solo) = register_participant(&both, &student(1), &individual(), Utc::now()) else {
            panic!("BOTH accepts individuals");
        };
        assert_eq!(solo.registration_type, RegistrationType::Individual);
        assert!(register_participant(&both, &student(2), &team_req, Utc::now()).is_ok());
    }

    #[test]
    fn team_mode_defaults_to_team_type() {
        let event = published(team_config(4));
        let req = request(json!({
            "teamName": "Defaults",
            "declarations": { "studentAuthenticity": true, "certificateAwareness": true },
            "teamMembers": [member("Member One", "m1@x.com")]
        }));
        let Ok(record) = register_participant(&event, &student(1), &req, Utc::now()) else {
            panic!("team mode should default to TEAM");
        };
        assert_eq!(record.registration_type, RegistrationType::Team);
    }

    #[test]
    fn short_team_name_is_rejected() {
        let event = published(team_config(4));
        let mut req = team(vec![member("Member One", "m1@x.com")]);
        req.team_name = Some("  X ".to_string());
        assert_eq!(
            register_participant(&event, &student(1), &req, Utc::now()),
            Err(RegistrationRejection::InvalidTeamName)
        );
    }

    #[test]
    fn invalid_leader_profile_is_labelled() {
        let event = published(team_config(4));
        let mut leader = student(1);
        leader.college_name = String::new();
        let req = team(vec![member("Member One", "m1@x.com")]);
        let Err(RegistrationRejection::InvalidProfile(msg)) =
            register_participant(&event, &leader, &req, Utc::now())
        else {
            panic!("expected InvalidProfile");
        };
        assert_eq!(msg, "Team leader college name is required");
    }

    #[test]
    fn invalid_member_is_numbered() {
        let event = published(team_config(4));
        let req = team(vec![
            member("Member One", "m1@x.com"),
            member("Member Two", "not-an-email"),
        ]);
        let Err(RegistrationRejection::InvalidProfile(msg)) =
            register_participant(&event, &student(1), &req, Utc::now())
        else {
            panic!("expected InvalidProfile");
        };
        assert_eq!(msg, "Team member 2 email is invalid");
    }

    #[test]
    fn team_head_count_counts_against_capacity() {
        let mut event = published(RegistrationConfig {
            participation_mode: ParticipationMode::Both,
            max_participants: Some(3),
            ..RegistrationConfig::default()
        });
        let now = Utc::now();
        assert!(apply_registration(&mut event, &student(1), &individual(), now).is_ok());

        let trio = team(vec![
            member("Member One", "m1@x.com"),
            member("Member Two", "m2@x.com"),
        ]);
        assert_eq!(
            apply_registration(&mut event, &student(2), &trio, now),
            Err(RegistrationRejection::EventFull {
                capacity: 3,
                remaining: 2,
                requested: 3
            })
        );

        let pair = team(vec![member("Member One", "m1@x.com")]);
        assert!(apply_registration(&mut event, &student(3), &pair, now).is_ok());
        assert_eq!(count_active_participants(event.participants()), 3);
    }

    #[test]
    fn rejection_never_mutates_event() {
        let mut event = published(team_config(3));
        let before = event.clone();
        let result = apply_registration(&mut event, &student(1), &team(vec![]), Utc::now());
        assert!(result.is_err());
        assert_eq!(event, before);
    }

    #[test]
    fn committed_record_snapshots_profile() {
        let mut event = published(RegistrationConfig::default());
        let user = student(7);
        let Ok(record) = apply_registration(&mut event, &user, &individual(), Utc::now()) else {
            panic!("should register");
        };
        assert_eq!(record.status, RegistrationStatus::Registered);
        assert_eq!(record.participant_profile.email, "student7@college.edu");
        assert_eq!(event.participants()[0], record);
    }

    /// A `BOTH` event holding one individual and one team of three.
    fn mixed_event() -> Event {
        let mut event = published(RegistrationConfig {
            participation_mode: ParticipationMode::Both,
            max_participants: Some(10),
            ..RegistrationConfig::default()
        });
        let now = Utc::now();
        let trio = team(vec![
            member("Member One", "m1@x.com"),
            member("Member Two", "m2@x.com"),
        ]);
        let Ok(_) = apply_registration(&mut event, &student(1), &trio, now) else {
            panic!("team should register");
        };
        let Ok(_) = apply_registration(&mut event, &student(2), &individual(), now) else {
            panic!("individual should register");
        };
        event
    }

    #[test]
    fn config_cannot_cap_below_registered_head_count() {
        let mut event = mixed_event();
        let before = event.registration.clone();
        let shrunk = RegistrationConfig {
            max_participants: Some(3),
            ..before.clone()
        };
        assert!(matches!(
            event.replace_registration_config(shrunk),
            Err(CampusError::InvalidRequest(msg)) if msg.contains("4 participants")
        ));
        assert_eq!(event.registration, before);

        let exact = RegistrationConfig {
            max_participants: Some(4),
            ..before
        };
        assert!(event.replace_registration_config(exact).is_ok());
    }

    #[test]
    fn config_mode_must_admit_existing_registration_types() {
        let mut event = mixed_event();
        for mode in [ParticipationMode::Individual, ParticipationMode::Team] {
            let next = RegistrationConfig {
                participation_mode: mode,
                ..event.registration.clone()
            };
            assert!(matches!(
                event.replace_registration_config(next),
                Err(CampusError::InvalidRequest(_))
            ));
        }
        assert_eq!(event.registration.participation_mode, ParticipationMode::Both);
    }

    #[test]
    fn config_team_size_must_fit_largest_team() {
        let mut event = mixed_event();
        let smaller = RegistrationConfig {
            max_team_members: 2,
            ..event.registration.clone()
        };
        assert!(matches!(
            event.replace_registration_config(smaller),
            Err(CampusError::InvalidRequest(msg)) if msg.contains("team of 3")
        ));

        let same = RegistrationConfig {
            max_team_members: 3,
            ..event.registration.clone()
        };
        assert!(event.replace_registration_config(same).is_ok());
    }

    #[test]
    fn combined_patch_against_registered_team_is_rejected() {
        let mut event = mixed_event();
        let Ok(patch) = serde_json::from_value::<RegistrationConfigPatch>(json!({
            "maxParticipants": 1,
            "participationMode": "INDIVIDUAL",
            "maxTeamMembers": 2
        })) else {
            panic!("patch should parse");
        };
        let next = patch.apply_to(&event.registration);
        assert!(event.replace_registration_config(next).is_err());
        assert_eq!(event.registration.max_participants, Some(10));
        assert_eq!(count_active_participants(event.participants()), 4);
    }
}
