use crate::errors::Result;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::CreateUserRequest;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
}

/// 初始化默认管理员账号
/// 如果数据库中没有任何用户，则创建 admin 账号，供外部签发的令牌绑定
async fn seed_admin(storage: &Arc<dyn Storage>) {
    // 检查是否已有用户
    match storage.count_users().await {
        Ok(count) if count > 0 => {
            debug!(
                "Database already has {} user(s), skipping admin seed",
                count
            );
            return;
        }
        Ok(_) => {
            info!("No users found in database, creating default admin account...");
        }
        Err(e) => {
            warn!("Failed to count users: {}, skipping admin seed", e);
            return;
        }
    }

    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@localhost".to_string());

    let admin_request = CreateUserRequest {
        username: "admin".to_string(),
        email,
        role: UserRole::Admin,
        profile_name: Some("Administrator".to_string()),
        roll_number: None,
        batch_id: None,
    };

    match storage.create_user(admin_request).await {
        Ok(user) => {
            warn!("==========================================================");
            warn!(
                "  Default admin account created (ID: {}, username: {})",
                user.id, user.username
            );
            warn!("  Issue a token with sub={} from the identity service", user.id);
            warn!("==========================================================");
        }
        Err(e) => {
            warn!("Failed to create admin account: {}", e);
        }
    }
}

/// 准备服务器启动的上下文
/// 包括存储初始化、数据库迁移和管理员账号
pub async fn prepare_server_startup() -> Result<StartupContext> {
    // 已安装时返回 Err，忽略即可
    let _ = rustls::crypto::ring::default_provider().install_default();

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    // 初始化默认管理员账号（如果需要）
    seed_admin(&storage).await;

    Ok(StartupContext { storage })
}
