use crate::core::http_client::{ApiClient, ApiRequest};
use crate::core::list_state::ListQuery;
use crate::domain::model::{
    Apartment, ApartmentUpdate, Application, ApplicationStatus, NewApartment, NewApplication,
    NewOwner, NewTenant, Owner, Paginated, Tenant,
};
use crate::utils::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

pub const APARTMENTS_PATH: &str = "/apartments";
pub const APPLICATIONS_PATH: &str = "/applications";
pub const OWNERS_PATH: &str = "/owners";
pub const TENANTS_PATH: &str = "/tenants";

/// 一組標準 REST CRUD 端點
pub struct Collection<'a, T> {
    client: &'a ApiClient,
    path: &'static str,
    _item: PhantomData<T>,
}

impl<'a, T: DeserializeOwned> Collection<'a, T> {
    pub fn new(client: &'a ApiClient, path: &'static str) -> Self {
        Self {
            client,
            path,
            _item: PhantomData,
        }
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path, id)
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Paginated<T>> {
        let request = ApiRequest::get(self.path).query(query.to_query_pairs());
        let page: Paginated<T> = self.client.send(request).await?;
        tracing::debug!(
            "📄 {} page {}/{} ({} items, {} total)",
            self.path,
            page.page,
            page.total_pages,
            page.items.len(),
            page.total
        );
        Ok(page)
    }

    pub async fn get(&self, id: &str) -> Result<T> {
        self.client.send(ApiRequest::get(self.item_path(id))).await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<T> {
        let request = ApiRequest::post(self.path).json(body)?;
        self.client.send(request).await
    }

    pub async fn update<B: Serialize + ?Sized>(&self, id: &str, body: &B) -> Result<T> {
        let request = ApiRequest::put(self.item_path(id)).json(body)?;
        self.client.send(request).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .send_empty(ApiRequest::delete(self.item_path(id)))
            .await?;
        tracing::info!("🗑️ Deleted {}", self.item_path(id));
        Ok(())
    }
}

pub struct ApartmentsApi<'a> {
    inner: Collection<'a, Apartment>,
}

impl<'a> ApartmentsApi<'a> {
    pub async fn list(&self, query: &ListQuery) -> Result<Paginated<Apartment>> {
        self.inner.list(query).await
    }

    /// 房東自己的物件
    pub async fn list_mine(&self, query: &ListQuery) -> Result<Paginated<Apartment>> {
        let request =
            ApiRequest::get(format!("{}/my", APARTMENTS_PATH)).query(query.to_query_pairs());
        self.inner.client.send(request).await
    }

    pub async fn get(&self, id: &str) -> Result<Apartment> {
        self.inner.get(id).await
    }

    pub async fn create(&self, apartment: &NewApartment) -> Result<Apartment> {
        self.inner.create(apartment).await
    }

    pub async fn update(&self, id: &str, update: &ApartmentUpdate) -> Result<Apartment> {
        self.inner.update(id, update).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id).await
    }
}

pub struct ApplicationsApi<'a> {
    inner: Collection<'a, Application>,
}

impl<'a> ApplicationsApi<'a> {
    pub async fn list(&self, query: &ListQuery) -> Result<Paginated<Application>> {
        self.inner.list(query).await
    }

    pub async fn get(&self, id: &str) -> Result<Application> {
        self.inner.get(id).await
    }

    /// 租客送出看房/租屋申請
    pub async fn create(&self, application: &NewApplication) -> Result<Application> {
        self.inner.create(application).await
    }

    pub async fn update_status(&self, id: &str, status: ApplicationStatus) -> Result<Application> {
        let request = ApiRequest::patch(format!("{}/{}/status", APPLICATIONS_PATH, id))
            .json(&serde_json::json!({ "status": status }))?;
        let application: Application = self.inner.client.send(request).await?;
        tracing::info!("📋 Application {} is now {}", id, application.status);
        Ok(application)
    }

    pub async fn cancel(&self, id: &str) -> Result<Application> {
        self.update_status(id, ApplicationStatus::Cancelled).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id).await
    }
}

pub struct OwnersApi<'a> {
    inner: Collection<'a, Owner>,
}

impl<'a> OwnersApi<'a> {
    pub async fn list(&self, query: &ListQuery) -> Result<Paginated<Owner>> {
        self.inner.list(query).await
    }

    pub async fn get(&self, id: &str) -> Result<Owner> {
        self.inner.get(id).await
    }

    pub async fn create(&self, owner: &NewOwner) -> Result<Owner> {
        self.inner.create(owner).await
    }

    pub async fn update(&self, id: &str, owner: &NewOwner) -> Result<Owner> {
        self.inner.update(id, owner).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id).await
    }
}

pub struct TenantsApi<'a> {
    inner: Collection<'a, Tenant>,
}

impl<'a> TenantsApi<'a> {
    pub async fn list(&self, query: &ListQuery) -> Result<Paginated<Tenant>> {
        self.inner.list(query).await
    }

    pub async fn get(&self, id: &str) -> Result<Tenant> {
        self.inner.get(id).await
    }

    pub async fn create(&self, tenant: &NewTenant) -> Result<Tenant> {
        self.inner.create(tenant).await
    }

    pub async fn update(&self, id: &str, tenant: &NewTenant) -> Result<Tenant> {
        self.inner.update(id, tenant).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id).await
    }
}

impl ApiClient {
    pub fn apartments(&self) -> ApartmentsApi<'_> {
        ApartmentsApi {
            inner: Collection::new(self, APARTMENTS_PATH),
        }
    }

    pub fn applications(&self) -> ApplicationsApi<'_> {
        ApplicationsApi {
            inner: Collection::new(self, APPLICATIONS_PATH),
        }
    }

    pub fn owners(&self) -> OwnersApi<'_> {
        OwnersApi {
            inner: Collection::new(self, OWNERS_PATH),
        }
    }

    pub fn tenants(&self) -> TenantsApi<'_> {
        TenantsApi {
            inner: Collection::new(self, TENANTS_PATH),
        }
    }
}
