//! Fixed catalog and staff accounts loaded into empty collections at startup.

use crate::data::activity::{Activity, ScheduleDetails};
use crate::data::teacher::Teacher;
use crate::error::{BackendError, HashError};
use crate::role::Role;
use crate::security::PasswordHasher;
use crate::store::{DocumentCollection, Filter, Store};

struct SeedActivity {
    name: &'static str,
    description: &'static str,
    schedule: &'static str,
    days: &'static [&'static str],
    start_time: &'static str,
    end_time: &'static str,
    max_participants: u32,
    participants: &'static [&'static str],
}

struct SeedTeacher {
    username: &'static str,
    display_name: &'static str,
    password: &'static str,
    role: Role,
}

const ACTIVITIES: &[SeedActivity] = &[
    SeedActivity {
        name: "Chess Club",
        description: "Learn strategies and compete in chess tournaments",
        schedule: "Mondays and Fridays, 3:15 PM - 4:45 PM",
        days: &["Monday", "Friday"],
        start_time: "15:15",
        end_time: "16:45",
        max_participants: 12,
        participants: &["michael@mergington.edu", "daniel@mergington.edu"],
    },
    SeedActivity {
        name: "Programming Class",
        description: "Learn programming fundamentals and build software projects",
        schedule: "Tuesdays and Thursdays, 7:00 AM - 8:00 AM",
        days: &["Tuesday", "Thursday"],
        start_time: "07:00",
        end_time: "08:00",
        max_participants: 20,
        participants: &["emma@mergington.edu", "sophia@mergington.edu"],
    },
    SeedActivity {
        name: "Morning Fitness",
        description: "Early morning physical training and exercises",
        schedule: "Mondays, Wednesdays, Fridays, 6:30 AM - 7:45 AM",
        days: &["Monday", "Wednesday", "Friday"],
        start_time: "06:30",
        end_time: "07:45",
        max_participants: 30,
        participants: &["john@mergington.edu", "olivia@mergington.edu"],
    },
    SeedActivity {
        name: "Soccer Team",
        description: "Join the school soccer team and compete in matches",
        schedule: "Tuesdays and Thursdays, 3:30 PM - 5:30 PM",
        days: &["Tuesday", "Thursday"],
        start_time: "15:30",
        end_time: "17:30",
        max_participants: 22,
        participants: &["liam@mergington.edu", "noah@mergington.edu"],
    },
    SeedActivity {
        name: "Basketball Team",
        description: "Practice and compete in basketball tournaments",
        schedule: "Wednesdays and Fridays, 3:15 PM - 5:00 PM",
        days: &["Wednesday", "Friday"],
        start_time: "15:15",
        end_time: "17:00",
        max_participants: 15,
        participants: &["ava@mergington.edu", "mia@mergington.edu"],
    },
    SeedActivity {
        name: "Art Club",
        description: "Explore various art techniques and create masterpieces",
        schedule: "Thursdays, 3:15 PM - 5:00 PM",
        days: &["Thursday"],
        start_time: "15:15",
        end_time: "17:00",
        max_participants: 15,
        participants: &["amelia@mergington.edu", "harper@mergington.edu"],
    },
    SeedActivity {
        name: "Drama Club",
        description: "Act, direct, and produce plays and performances",
        schedule: "Mondays and Wednesdays, 3:30 PM - 5:30 PM",
        days: &["Monday", "Wednesday"],
        start_time: "15:30",
        end_time: "17:30",
        max_participants: 20,
        participants: &["ella@mergington.edu", "scarlett@mergington.edu"],
    },
    SeedActivity {
        name: "Math Club",
        description: "Solve challenging problems and prepare for math competitions",
        schedule: "Tuesdays, 7:15 AM - 8:00 AM",
        days: &["Tuesday"],
        start_time: "07:15",
        end_time: "08:00",
        max_participants: 10,
        participants: &["james@mergington.edu", "benjamin@mergington.edu"],
    },
    SeedActivity {
        name: "Debate Team",
        description: "Develop public speaking and argumentation skills",
        schedule: "Fridays, 3:30 PM - 5:30 PM",
        days: &["Friday"],
        start_time: "15:30",
        end_time: "17:30",
        max_participants: 12,
        participants: &["charlotte@mergington.edu", "amelia@mergington.edu"],
    },
    SeedActivity {
        name: "Weekend Robotics Workshop",
        description: "Build and program robots in our state-of-the-art workshop",
        schedule: "Saturdays, 10:00 AM - 2:00 PM",
        days: &["Saturday"],
        start_time: "10:00",
        end_time: "14:00",
        max_participants: 15,
        participants: &["ethan@mergington.edu", "oliver@mergington.edu"],
    },
    SeedActivity {
        name: "Science Olympiad",
        description: "Weekend science competition preparation for regional and state events",
        schedule: "Saturdays, 1:00 PM - 4:00 PM",
        days: &["Saturday"],
        start_time: "13:00",
        end_time: "16:00",
        max_participants: 18,
        participants: &["isabella@mergington.edu", "lucas@mergington.edu"],
    },
    SeedActivity {
        name: "Sunday Chess Tournament",
        description: "Weekly tournament for serious chess players with rankings",
        schedule: "Sundays, 2:00 PM - 5:00 PM",
        days: &["Sunday"],
        start_time: "14:00",
        end_time: "17:00",
        max_participants: 16,
        participants: &["william@mergington.edu", "jacob@mergington.edu"],
    },
    SeedActivity {
        name: "Manga Maniacs",
        description: "Explore the fantastic stories of the most interesting characters from Japanese Manga (graphic novels).",
        schedule: "Tuesdays, 7:00 PM - 8:00 PM",
        days: &["Tuesday"],
        start_time: "19:00",
        end_time: "20:00",
        max_participants: 15,
        participants: &[],
    },
];

const TEACHERS: &[SeedTeacher] = &[
    SeedTeacher {
        username: "mrodriguez",
        display_name: "Ms. Rodriguez",
        password: "art123",
        role: Role::Teacher,
    },
    SeedTeacher {
        username: "mchen",
        display_name: "Mr. Chen",
        password: "chess456",
        role: Role::Teacher,
    },
    SeedTeacher {
        username: "principal",
        display_name: "Principal Martinez",
        password: "admin789",
        role: Role::Admin,
    },
];

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|it| it.to_string()).collect()
}

pub fn initial_activities() -> Vec<Activity> {
    ACTIVITIES
        .iter()
        .map(|seed| Activity {
            name: seed.name.to_string(),
            description: seed.description.to_string(),
            schedule: seed.schedule.to_string(),
            schedule_details: ScheduleDetails {
                days: to_strings(seed.days),
                start_time: seed.start_time.to_string(),
                end_time: seed.end_time.to_string(),
            },
            max_participants: seed.max_participants,
            participants: to_strings(seed.participants),
        })
        .collect()
}

/// Seed staff accounts with their credentials already hashed.
pub fn initial_teachers(hasher: &PasswordHasher) -> Result<Vec<Teacher>, HashError> {
    TEACHERS
        .iter()
        .map(|seed| -> Result<Teacher, HashError> {
            Ok(Teacher::new(
                seed.username,
                seed.display_name,
                hasher.hash(seed.password)?,
                seed.role,
            ))
        })
        .collect()
}

/// Populates each collection from the seed data only if it is empty, so
/// repeated calls leave the store unchanged.
pub async fn init_database(store: &mut Store, hasher: &PasswordHasher) -> Result<(), BackendError> {
    if store.activities.count_documents(&Filter::all()).await? == 0 {
        let activities = initial_activities();
        tracing::info!("Seeding {} activities...", activities.len());
        for activity in activities {
            store.activities.insert_one(activity.to_document()?).await?;
        }
    } else {
        tracing::debug!("Activities already present, skipping seed.");
    }

    if store.teachers.count_documents(&Filter::all()).await? == 0 {
        let teachers = initial_teachers(hasher)?;
        tracing::info!("Seeding {} teacher accounts...", teachers.len());
        for teacher in teachers {
            store.teachers.insert_one(teacher.to_document()?).await?;
        }
    } else {
        tracing::debug!("Teacher accounts already present, skipping seed.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_well_formed() {
        let activities = initial_activities();
        assert_eq!(activities.len(), 13);

        for activity in &activities {
            let details = &activity.schedule_details;
            assert!(!details.days.is_empty(), "{} has no days", activity.name);
            assert_eq!(details.start_time.len(), 5, "{}", activity.name);
            assert_eq!(details.end_time.len(), 5, "{}", activity.name);
            assert!(details.start_time < details.end_time, "{}", activity.name);
            assert!(!activity.is_full(), "{}", activity.name);
        }
    }

    #[test]
    fn seed_accounts_are_hashed() {
        let teachers = initial_teachers(&PasswordHasher::new(4).unwrap()).unwrap();

        assert_eq!(teachers.len(), 3);
        for (teacher, seed) in teachers.iter().zip(TEACHERS) {
            assert_eq!(teacher.username, seed.username);
            assert!(teacher.password.verify(seed.password));
        }
        assert_eq!(
            teachers.iter().filter(|it| it.role.is_admin()).count(),
            1
        );
    }
}
