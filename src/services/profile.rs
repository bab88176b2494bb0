use serde::Serialize;
use serde_json::json;

use crate::backend::{eq, from_row, to_row, Backend, Query, Table};
use crate::errors::{Action, AppError};
use crate::models::{Notice, Profile, ProfileUpdate};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfileView {
    /// From the identity provider; shown but never editable here.
    pub email: Option<String>,
    pub profile: Profile,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfileSaved {
    pub profile: Profile,
    pub notice: Notice,
}

async fn fetch_profile(
    backend: &dyn Backend,
    user_id: &str,
    action: Action,
) -> Result<Profile, AppError> {
    let rows = backend
        .select(&Query::table(Table::Profiles).eq("user_id", user_id))
        .await
        .map_err(|e| AppError::backend(action, e))?;

    let mut rows = rows.into_iter();
    match (rows.next(), rows.next()) {
        (None, _) => Err(AppError::NotFound(action.failure_message().to_string())),
        (Some(row), None) => from_row(row).map_err(|e| AppError::backend(action, e)),
        (Some(_), Some(_)) => Err(AppError::backend(
            action,
            anyhow::anyhow!("expected one profile for user {user_id}"),
        )),
    }
}

pub async fn load_profile(
    backend: &dyn Backend,
    user_id: &str,
    email: Option<&str>,
) -> Result<ProfileView, AppError> {
    let profile = fetch_profile(backend, user_id, Action::LoadProfile).await?;
    Ok(ProfileView {
        email: email.map(str::to_string),
        profile,
    })
}

/// Writes the new name and phone over the stored profile. An empty phone clears it.
pub async fn save_profile(
    backend: &dyn Backend,
    user_id: &str,
    update: ProfileUpdate,
) -> Result<ProfileSaved, AppError> {
    let full_name = update.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(AppError::validation("Informe seu nome completo"));
    }
    let phone = update
        .phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    let action = Action::SaveProfile;
    let mut profile = fetch_profile(backend, user_id, action).await?;

    let changes = to_row(&json!({
        "full_name": full_name,
        "phone": phone,
    }))
    .map_err(|e| AppError::backend(action, e))?;

    let touched = backend
        .update(Table::Profiles, changes, &[eq("user_id", user_id)])
        .await
        .map_err(|e| AppError::backend(action, e))?;
    if touched == 0 {
        return Err(AppError::NotFound(action.failure_message().to_string()));
    }

    profile.full_name = full_name;
    profile.phone = phone;
    tracing::info!(user_id, "profile updated");

    Ok(ProfileSaved {
        profile,
        notice: Notice::success(
            "Perfil atualizado",
            "Suas informações foram salvas com sucesso",
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{memory_backend, FailingBackend};

    async fn seed_profile(backend: &dyn Backend, user_id: &str) {
        backend
            .insert(
                Table::Profiles,
                to_row(&json!({
                    "user_id": user_id,
                    "full_name": "Ana Souza",
                    "phone": "(11) 99999-9999",
                    "avatar_url": "avatars/ana.png",
                }))
                .unwrap(),
            )
            .await
            .unwrap();
    }

    fn update(full_name: &str, phone: Option<&str>) -> ProfileUpdate {
        ProfileUpdate {
            full_name: full_name.to_string(),
            phone: phone.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_load_profile_with_email() {
        let backend = memory_backend();
        seed_profile(&backend, "u-1").await;

        let view = load_profile(&backend, "u-1", Some("ana@example.com")).await.unwrap();
        assert_eq!(view.email.as_deref(), Some("ana@example.com"));
        assert_eq!(view.profile.full_name, "Ana Souza");
        assert_eq!(view.profile.phone.as_deref(), Some("(11) 99999-9999"));
    }

    #[tokio::test]
    async fn test_missing_profile() {
        let backend = memory_backend();
        let err = load_profile(&backend, "nobody", None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.to_string(), "Não foi possível carregar o perfil");
    }

    #[tokio::test]
    async fn test_save_updates_name_and_clears_phone() {
        let backend = memory_backend();
        seed_profile(&backend, "u-1").await;

        let saved = save_profile(&backend, "u-1", update(" Ana Lima ", Some("  ")))
            .await
            .unwrap();
        assert_eq!(saved.profile.full_name, "Ana Lima");
        assert_eq!(saved.profile.phone, None);
        assert_eq!(saved.profile.avatar_url.as_deref(), Some("avatars/ana.png"));
        assert_eq!(saved.notice.title, "Perfil atualizado");

        let reloaded = load_profile(&backend, "u-1", None).await.unwrap();
        assert_eq!(reloaded.profile, saved.profile);
    }

    #[tokio::test]
    async fn test_empty_name_rejected_before_backend() {
        let err = save_profile(&FailingBackend, "u-1", update("   ", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_save_failure_is_generic() {
        let err = save_profile(&FailingBackend, "u-1", update("Ana", None))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Não foi possível salvar as alterações");
    }
}
