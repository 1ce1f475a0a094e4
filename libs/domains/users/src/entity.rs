//! Sea-ORM entities for users, roles and role membership.

pub mod users {
    use database::AuditFields;
    use sea_orm::ActiveValue::Set;
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub first_name: String,
        pub last_name: String,
        pub email: String,
        #[sea_orm(column_type = "Text")]
        pub password_hash: String,
        pub is_active: bool,
        pub is_deleted: bool,
        pub created_at: DateTimeWithTimeZone,
        pub created_by: Option<Uuid>,
        pub updated_at: Option<DateTimeWithTimeZone>,
        pub updated_by: Option<Uuid>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::User {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                first_name: model.first_name,
                last_name: model.last_name,
                email: model.email,
                password_hash: model.password_hash,
                audit: AuditFields {
                    created_at: model.created_at.into(),
                    created_by: model.created_by,
                    updated_at: model.updated_at.map(Into::into),
                    updated_by: model.updated_by,
                    is_active: model.is_active,
                    is_deleted: model.is_deleted,
                },
            }
        }
    }

    impl From<crate::models::User> for ActiveModel {
        fn from(user: crate::models::User) -> Self {
            ActiveModel {
                id: Set(user.id),
                first_name: Set(user.first_name),
                last_name: Set(user.last_name),
                email: Set(user.email),
                password_hash: Set(user.password_hash),
                is_active: Set(user.audit.is_active),
                is_deleted: Set(user.audit.is_deleted),
                created_at: Set(user.audit.created_at.into()),
                created_by: Set(user.audit.created_by),
                updated_at: Set(user.audit.updated_at.map(Into::into)),
                updated_by: Set(user.audit.updated_by),
            }
        }
    }
}

pub mod roles {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "roles")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::Role {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                name: model.name,
            }
        }
    }
}

pub mod user_roles {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "user_roles")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub user_id: Uuid,
        #[sea_orm(primary_key, auto_increment = false)]
        pub role_id: Uuid,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
