use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::AnyPool;
use sqlx::Row;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    CoreModule, LocatorKind, PairCoreRtv, RtvModule, ServerTypeId, VaCenter, VaCenterList,
    RTV_MODULE_TYPE_DESC, RTV_MODULE_TYPE_ID,
};

/// Read access to the locator tables of the configuration database
#[async_trait]
pub trait LocatorRepository: Send + Sync {
    /// VA centers reachable by an active user, one entry per VA group
    async fn vacenters_by_user(&self, guid: &str) -> Result<VaCenterList, DatabaseError>;

    /// Resolve a campaign, branch or VA center to its core/RTV pair
    async fn pair_by_locator(&self, kind: LocatorKind, guid: &str) -> Result<PairCoreRtv, DatabaseError>;

    /// RTV servers, all of them when `id` is `None`
    async fn rtv_by_id(&self, id: Option<i64>) -> Result<Vec<RtvModule>, DatabaseError>;

    /// Core modules, all of them when `id` is `None`
    async fn core_by_id(&self, id: Option<i64>) -> Result<Vec<CoreModule>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

const VACENTERS_BY_USER_SQL: &str = r#"
    SELECT c.guid AS guid, c.name AS name
    FROM WUsers u
    JOIN WRWUsersWVAGroup ug ON ug.IdUser = u.IdUser
    JOIN WVAGroups g ON g.IdVAGroup = ug.IdVAGroup
    JOIN WVACenter c ON c.guid = g.IdVACenter AND c.enabled = 1
    WHERE u.IdUser = ? AND u.Active = 1
    GROUP BY g.IdVAGroup, c.name, c.guid
    ORDER BY c.name
"#;

// Branch group Type: 0 and 2 are one-to-one, 1 is one-to-many
const PAIR_BY_VACENTER_SQL: &str = r#"
    SELECT cp.idWZone AS core_id, bv.idWRTV AS rtv_id
    FROM WVACenter c
    JOIN WVAGroups g ON g.IdVACenter = c.guid
    JOIN WRWBranchGroupWVAGroup bv ON bv.IdVAGroup = g.IdVAGroup
    JOIN WBranchGroup bg ON bg.guid = bv.IdBranchGroup AND bg.Type IN (0, 2) AND bg.enabled = 1
    JOIN WCampaign cp ON cp.guid = bg.WCampaign AND cp.enabled = 1
    WHERE c.guid = ? AND c.enabled = 1
    LIMIT 1
"#;

const PAIR_BY_BRANCH_SQL: &str = r#"
    SELECT cp.idWZone AS core_id, bv.idWRTV AS rtv_id
    FROM WBranch b
    JOIN WBranchGroup bg ON bg.guid = b.WBranchGroup
    JOIN WRWBranchGroupWVAGroup bv ON bv.IdBranchGroup = bg.guid
    JOIN WCampaign cp ON cp.guid = b.WCampaign AND cp.enabled = 1
    WHERE b.guid = ? AND b.enabled = 1
    LIMIT 1
"#;

const PAIR_BY_CAMPAIGN_SQL: &str = r#"
    SELECT cp.idWZone AS core_id, bv.idWRTV AS rtv_id
    FROM WCampaign cp
    JOIN WBranchGroup bg ON bg.WCampaign = cp.guid
    JOIN WRWBranchGroupWVAGroup bv ON bv.IdBranchGroup = bg.guid
    JOIN WRWZoneCountry z ON z.idWZone = cp.idWZone
    WHERE cp.guid = ?
    LIMIT 1
"#;

const RTV_COLUMNS: &str = r#"
    SELECT idWRTV AS id, Description AS description, ip,
           WebPort AS port_http, SecureWebPort AS port_https,
           CorePort AS port_core, WebControlPort AS port_webcontrol
    FROM WRTV
"#;

const CORE_COLUMNS: &str = r#"
    SELECT m.idWCore AS id, c.Description AS description,
           t.idWCoreServerType AS module_type_id, t.Description AS module_type_desc,
           m.ip AS ip, m.WebPort AS port_http, m.SecureWebPort AS port_https,
           m.CorePort AS port_core, m.WebControlPort AS port_webcontrol
    FROM WCoreModules m
    JOIN WCores c ON c.idWCore = m.idWCore
    JOIN WCoreServerTypes t ON t.idWCoreServerType = m.idWCoreServerType
"#;

/// `LocatorRepository` over an sqlx `Any` pool (MySQL in production, SQLite in tests)
pub struct SqlLocatorRepository {
    database: DatabaseManager,
}

impl SqlLocatorRepository {
    pub fn new(database: DatabaseManager) -> Self {
        Self { database }
    }

    fn pool(&self) -> &AnyPool {
        self.database.pool()
    }

    fn pair_sql(kind: LocatorKind) -> &'static str {
        match kind {
            LocatorKind::Campaign => PAIR_BY_CAMPAIGN_SQL,
            LocatorKind::Branch => PAIR_BY_BRANCH_SQL,
            LocatorKind::VaCenter => PAIR_BY_VACENTER_SQL,
        }
    }

    fn rtv_from_row(row: &AnyRow) -> Result<RtvModule, DatabaseError> {
        Ok(RtvModule {
            id: row.try_get("id")?,
            description: row.try_get("description")?,
            module_type_id: RTV_MODULE_TYPE_ID,
            module_type_desc: Some(RTV_MODULE_TYPE_DESC.to_string()),
            ip: row.try_get("ip")?,
            port_http: row.try_get("port_http")?,
            port_https: row.try_get("port_https")?,
            port_core: row.try_get("port_core")?,
            port_webcontrol: row.try_get("port_webcontrol")?,
        })
    }

    fn core_from_row(row: &AnyRow) -> Result<CoreModule, DatabaseError> {
        let module_type: String = row.try_get("module_type_id")?;
        let module_type_id = ServerTypeId::from_column(&module_type);

        Ok(CoreModule {
            id: row.try_get("id")?,
            description: row.try_get("description")?,
            module_type_id,
            module_type_desc: row.try_get("module_type_desc")?,
            ip: row.try_get("ip")?,
            port_http: row.try_get("port_http")?,
            port_https: row.try_get("port_https")?,
            port_core: row.try_get("port_core")?,
            port_webcontrol: row.try_get("port_webcontrol")?,
        })
    }
}

#[async_trait]
impl LocatorRepository for SqlLocatorRepository {
    async fn vacenters_by_user(&self, guid: &str) -> Result<VaCenterList, DatabaseError> {
        let rows = sqlx::query(VACENTERS_BY_USER_SQL)
            .bind(guid)
            .fetch_all(self.pool())
            .await?;

        if rows.is_empty() {
            return Err(DatabaseError::NotFound(format!("no VA centers for user {}", guid)));
        }

        let vacenter_list = rows
            .iter()
            .map(|row| -> Result<VaCenter, DatabaseError> {
                Ok(VaCenter {
                    guid: row.try_get("guid")?,
                    name: row.try_get("name")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(VaCenterList {
            user_guid: guid.to_string(),
            vacenter_list,
        })
    }

    async fn pair_by_locator(&self, kind: LocatorKind, guid: &str) -> Result<PairCoreRtv, DatabaseError> {
        let row = sqlx::query(Self::pair_sql(kind))
            .bind(guid)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {}", kind, guid)))?;

        let core_id: Option<i64> = row.try_get("core_id")?;
        let rtv_id: Option<i64> = row.try_get("rtv_id")?;
        match (core_id, rtv_id) {
            (Some(core_id), Some(rtv_id)) => Ok(PairCoreRtv::new(kind, guid, core_id, rtv_id)),
            _ => {
                tracing::warn!("{} {} has no core or RTV assigned", kind, guid);
                Err(DatabaseError::NotFound(format!("{} {}", kind, guid)))
            }
        }
    }

    async fn rtv_by_id(&self, id: Option<i64>) -> Result<Vec<RtvModule>, DatabaseError> {
        let rows = match id {
            Some(id) => {
                let sql = format!("{} WHERE idWRTV = ? ORDER BY idWRTV", RTV_COLUMNS);
                sqlx::query(&sql).bind(id).fetch_all(self.pool()).await?
            }
            None => {
                let sql = format!("{} ORDER BY idWRTV", RTV_COLUMNS);
                sqlx::query(&sql).fetch_all(self.pool()).await?
            }
        };

        if rows.is_empty() {
            return Err(DatabaseError::NotFound(format!("RTV {}", id.unwrap_or_default())));
        }
        rows.iter().map(Self::rtv_from_row).collect()
    }

    async fn core_by_id(&self, id: Option<i64>) -> Result<Vec<CoreModule>, DatabaseError> {
        let rows = match id {
            Some(id) => {
                let sql = format!("{} WHERE m.idWCore = ? ORDER BY m.idWCore", CORE_COLUMNS);
                sqlx::query(&sql).bind(id).fetch_all(self.pool()).await?
            }
            None => {
                let sql = format!("{} ORDER BY m.idWCore", CORE_COLUMNS);
                sqlx::query(&sql).fetch_all(self.pool()).await?
            }
        };

        if rows.is_empty() {
            return Err(DatabaseError::NotFound(format!("core {}", id.unwrap_or_default())));
        }
        rows.iter().map(Self::core_from_row).collect()
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.database.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, Fixture};

    async fn repository() -> SqlLocatorRepository {
        SqlLocatorRepository::new(testing::seeded_database().await)
    }

    async fn execute(repository: &SqlLocatorRepository, sql: &str) {
        sqlx::query(sql).execute(repository.pool()).await.unwrap();
    }

    fn assert_fixture_ports(module: &CoreModule) {
        assert_eq!(module.ip.as_deref(), Some(Fixture::IP));
        assert_eq!(module.port_http, Some(Fixture::WEB_PORT));
        assert_eq!(module.port_https, Some(Fixture::SECURE_WEB_PORT));
        assert_eq!(module.port_core, Some(Fixture::CORE_PORT));
        assert_eq!(module.port_webcontrol, Some(Fixture::WEBCONTROL_PORT));
    }

    #[tokio::test]
    async fn core_by_id_without_id_returns_every_module() {
        let modules = repository().await.core_by_id(None).await.unwrap();
        assert_eq!(modules.len(), 4);
        for module in &modules {
            assert_eq!(module.description.as_deref(), Some("dummy cores"));
            assert_fixture_ports(module);
        }
    }

    #[tokio::test]
    async fn core_by_id_joins_server_types() {
        let modules = repository().await.core_by_id(Some(Fixture::CORE_ID)).await.unwrap();
        assert_eq!(modules.len(), 4);
        let types: Vec<(ServerTypeId, Option<&str>)> = modules
            .iter()
            .map(|m| (m.module_type_id.clone(), m.module_type_desc.as_deref()))
            .collect();
        assert!(types.contains(&(ServerTypeId::Numeric(11), Some("LM"))));
        assert!(types.contains(&(ServerTypeId::Numeric(25), Some("KPI"))));
    }

    #[tokio::test]
    async fn non_numeric_server_type_is_passed_through() {
        let repository = repository().await;
        execute(&repository, "INSERT INTO WCoreServerTypes (idWCoreServerType, Description) VALUES ('PBX-A', 'x')").await;
        execute(
            &repository,
            "INSERT INTO WCoreModules (idWCore, idWCoreServerType, ip, WebPort, SecureWebPort, CorePort, WebControlPort) \
             VALUES (1, 'PBX-A', '127.0.0.1', 80, 443, 9889, 9880)",
        )
        .await;

        let modules = repository.core_by_id(Some(Fixture::CORE_ID)).await.unwrap();
        assert_eq!(modules.len(), 5);
        assert!(modules
            .iter()
            .any(|m| m.module_type_id == ServerTypeId::Text("PBX-A".to_string())
                && m.module_type_desc.as_deref() == Some("x")));
        assert!(modules.iter().any(|m| m.module_type_id == ServerTypeId::Numeric(11)));
    }

    #[tokio::test]
    async fn core_by_unknown_id_is_not_found() {
        let err = repository().await.core_by_id(Some(2)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn rtv_by_id_without_id_returns_all_in_order() {
        let rtvs = repository().await.rtv_by_id(None).await.unwrap();
        assert_eq!(rtvs.len(), 2);
        assert_eq!(rtvs[0].id, Fixture::RTV_ID);
        assert_eq!(rtvs[0].description.as_deref(), Some("dummy rtv 1"));
        assert_eq!(rtvs[1].id, 5);
        assert_eq!(rtvs[1].description.as_deref(), Some("dummy rtv 2"));
        for rtv in &rtvs {
            assert_eq!(rtv.module_type_id, RTV_MODULE_TYPE_ID);
            assert_eq!(rtv.module_type_desc.as_deref(), Some("RTV"));
            assert_fixture_ports(rtv);
        }
    }

    #[tokio::test]
    async fn rtv_by_id_returns_single_rtv() {
        let rtvs = repository().await.rtv_by_id(Some(Fixture::RTV_ID)).await.unwrap();
        assert_eq!(rtvs.len(), 1);
        assert_eq!(rtvs[0].description.as_deref(), Some("dummy rtv 1"));
    }

    #[tokio::test]
    async fn rtv_by_unknown_id_is_not_found() {
        let err = repository().await.rtv_by_id(Some(6)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn pair_by_branch_resolves_core_and_rtv() {
        let pair = repository()
            .await
            .pair_by_locator(LocatorKind::Branch, Fixture::BRANCH_GUID)
            .await
            .unwrap();
        assert_eq!(pair.core_locator, LocatorKind::Branch);
        assert_eq!(pair.core_locator_id, Fixture::BRANCH_GUID);
        assert_eq!(pair.core_id, Fixture::CORE_ID);
        assert_eq!(pair.rtv_id, Fixture::RTV_ID);
    }

    #[tokio::test]
    async fn pair_by_campaign_resolves_core_and_rtv() {
        let pair = repository()
            .await
            .pair_by_locator(LocatorKind::Campaign, Fixture::CAMPAIGN_GUID)
            .await
            .unwrap();
        assert_eq!(pair.core_locator, LocatorKind::Campaign);
        assert_eq!(pair.core_id, Fixture::CORE_ID);
        assert_eq!(pair.rtv_id, Fixture::RTV_ID);
    }

    #[tokio::test]
    async fn pair_by_vacenter_resolves_core_and_rtv() {
        let pair = repository()
            .await
            .pair_by_locator(LocatorKind::VaCenter, Fixture::VACENTER_GUID)
            .await
            .unwrap();
        assert_eq!(pair.core_locator, LocatorKind::VaCenter);
        assert_eq!(pair.core_id, Fixture::CORE_ID);
        assert_eq!(pair.rtv_id, Fixture::RTV_ID);
    }

    #[tokio::test]
    async fn pair_by_unknown_locator_is_not_found() {
        let repository = repository().await;
        for kind in [LocatorKind::Campaign, LocatorKind::Branch, LocatorKind::VaCenter] {
            let err = repository
                .pair_by_locator(kind, Fixture::WRONG_GUID)
                .await
                .unwrap_err();
            assert!(err.is_not_found(), "{} should not resolve", kind);
        }
    }

    #[tokio::test]
    async fn disabled_branch_is_not_resolved() {
        let repository = repository().await;
        sqlx::query("UPDATE WBranch SET enabled = 0 WHERE guid = ?")
            .bind(Fixture::BRANCH_GUID)
            .execute(repository.pool())
            .await
            .unwrap();

        let err = repository
            .pair_by_locator(LocatorKind::Branch, Fixture::BRANCH_GUID)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn disabled_campaign_hides_its_branches_and_vacenters() {
        let repository = repository().await;
        execute(&repository, "UPDATE WCampaign SET enabled = 0").await;

        for (kind, guid) in [
            (LocatorKind::Branch, Fixture::BRANCH_GUID),
            (LocatorKind::VaCenter, Fixture::VACENTER_GUID),
        ] {
            let err = repository.pair_by_locator(kind, guid).await.unwrap_err();
            assert!(err.is_not_found(), "{} should not resolve", kind);
        }
    }

    #[tokio::test]
    async fn vacenter_behind_one_to_many_branch_group_is_not_resolved() {
        let repository = repository().await;
        execute(&repository, "UPDATE WBranchGroup SET Type = 1").await;

        let err = repository
            .pair_by_locator(LocatorKind::VaCenter, Fixture::VACENTER_GUID)
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        // Branches do not depend on the group type
        repository
            .pair_by_locator(LocatorKind::Branch, Fixture::BRANCH_GUID)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn campaign_without_zone_is_not_resolved() {
        let repository = repository().await;
        execute(&repository, "DELETE FROM WRWZoneCountry").await;

        let err = repository
            .pair_by_locator(LocatorKind::Campaign, Fixture::CAMPAIGN_GUID)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn missing_rtv_assignment_is_not_found() {
        let repository = repository().await;
        execute(&repository, "UPDATE WRWBranchGroupWVAGroup SET idWRTV = NULL").await;

        for (kind, guid) in [
            (LocatorKind::Campaign, Fixture::CAMPAIGN_GUID),
            (LocatorKind::Branch, Fixture::BRANCH_GUID),
            (LocatorKind::VaCenter, Fixture::VACENTER_GUID),
        ] {
            let err = repository.pair_by_locator(kind, guid).await.unwrap_err();
            assert!(err.is_not_found(), "{} should not resolve", kind);
        }
    }

    #[tokio::test]
    async fn vacenters_by_user_lists_enabled_centers() {
        let list = repository().await.vacenters_by_user(Fixture::USER_GUID).await.unwrap();
        assert_eq!(list.user_guid, Fixture::USER_GUID);
        assert_eq!(list.vacenter_list.len(), 1);
        assert_eq!(list.vacenter_list[0].guid, Fixture::VACENTER_GUID);
        assert_eq!(list.vacenter_list[0].name, "dummy vacenter");
    }

    #[tokio::test]
    async fn inactive_user_has_no_vacenters() {
        let repository = repository().await;
        execute(&repository, "UPDATE WUsers SET Active = 0").await;

        let err = repository.vacenters_by_user(Fixture::USER_GUID).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn vacenters_by_unknown_user_is_not_found() {
        let err = repository().await.vacenters_by_user(Fixture::WRONG_GUID).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn health_check_pings_database() {
        repository().await.health_check().await.unwrap();
    }
}
