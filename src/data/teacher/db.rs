use crate::data::teacher::Teacher;
use crate::error::StoreError;
use crate::store::{DocumentCollection, Filter, Store};

pub trait TeacherDbExt {
    async fn find_teacher(&self, username: impl AsRef<str>) -> Result<Option<Teacher>, StoreError>;

    /// Returns the account only when `password` matches its stored hash.
    async fn verify_teacher(
        &self,
        username: impl AsRef<str>,
        password: impl AsRef<str>,
    ) -> Result<Option<Teacher>, StoreError>;
}

impl TeacherDbExt for Store {
    async fn find_teacher(&self, username: impl AsRef<str>) -> Result<Option<Teacher>, StoreError> {
        self.teachers
            .find_one(&Filter::by_id(username.as_ref()))
            .await?
            .map(Teacher::try_from)
            .transpose()
    }

    async fn verify_teacher(
        &self,
        username: impl AsRef<str>,
        password: impl AsRef<str>,
    ) -> Result<Option<Teacher>, StoreError> {
        let teacher = self.find_teacher(username).await?;

        Ok(teacher.filter(|it| it.password.verify(password.as_ref())))
    }
}

#[cfg(test)]
mod teacher_db {
    use super::*;
    use crate::role::Role;
    use crate::security::PasswordHasher;

    async fn store_with_teacher(username: &str, password: &str, role: Role) -> (Store, Teacher) {
        let hash = PasswordHasher::new(4).unwrap().hash(password).unwrap();
        let teacher = Teacher::new(username, "Ms. Example", hash, role);

        let mut store = Store::in_memory();
        store
            .teachers
            .insert_one(teacher.to_document().unwrap())
            .await
            .unwrap();
        (store, teacher)
    }

    #[tokio::test]
    async fn teacher_is_keyed_by_username() {
        let (store, teacher) = store_with_teacher("mrodriguez", "art123", Role::Teacher).await;

        let raw = store
            .teachers
            .find_one(&Filter::by_id("mrodriguez"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(raw.get_str("_id").unwrap(), "mrodriguez");
        assert_eq!(raw.get_str("role").unwrap(), "teacher");
        assert!(raw.get_str("password").unwrap().starts_with("bcrypt-sha256$"));

        assert_eq!(store.find_teacher("mrodriguez").await.unwrap(), Some(teacher));
        assert_eq!(store.find_teacher("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn verify_checks_password() {
        let (store, _) = store_with_teacher("principal", "admin789", Role::Admin).await;

        let admin = store.verify_teacher("principal", "admin789").await.unwrap();
        assert!(admin.map(|it| it.role.is_admin()).unwrap_or(false));

        assert_eq!(store.verify_teacher("principal", "admin788").await.unwrap(), None);
        assert_eq!(store.verify_teacher("nobody", "admin789").await.unwrap(), None);
    }
}
