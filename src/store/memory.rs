//! In-process store with the same join semantics as [`super::PgStore`].
//!
//! Tables are keyed by id, so projections come out in id order. Writes take one lock for the
//! whole read-modify-write, which serializes concurrent patches of the same product.

use super::StorekeeperStore;
use crate::error::AppError;
use crate::model::{
    Buyer, BuyerInfo, Description, Order, OrderInfo, Product, ProductData, ProductInfo, Provider,
    SaleInfo, SalesAccounting,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<i32, Product>,
    descriptions: BTreeMap<i32, Description>,
    sales: BTreeMap<i32, SalesAccounting>,
    buyers: BTreeMap<i32, Buyer>,
    providers: BTreeMap<i32, Provider>,
    orders: BTreeMap<i32, Order>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

fn poisoned<T>(_: PoisonError<T>) -> AppError {
    AppError::Internal("memory store lock poisoned".into())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product(&self, id: i32) -> Result<Option<Product>, AppError> {
        Ok(self.tables.read().map_err(poisoned)?.products.get(&id).cloned())
    }

    /// All products in id order.
    pub fn products(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.tables.read().map_err(poisoned)?.products.values().cloned().collect())
    }

    pub fn insert_description(&self, row: Description) -> Result<(), AppError> {
        self.tables.write().map_err(poisoned)?.descriptions.insert(row.id, row);
        Ok(())
    }

    pub fn insert_provider(&self, row: Provider) -> Result<(), AppError> {
        self.tables.write().map_err(poisoned)?.providers.insert(row.id, row);
        Ok(())
    }

    pub fn insert_buyer(&self, row: Buyer) -> Result<(), AppError> {
        self.tables.write().map_err(poisoned)?.buyers.insert(row.id, row);
        Ok(())
    }

    pub fn insert_order(&self, row: Order) -> Result<(), AppError> {
        let mut t = self.tables.write().map_err(poisoned)?;
        if !t.providers.contains_key(&row.provider_id) {
            return Err(AppError::InvalidReference {
                field: "provider_id",
                id: row.provider_id,
            });
        }
        t.orders.insert(row.id, row);
        Ok(())
    }

    pub fn insert_product(&self, row: Product) -> Result<(), AppError> {
        let mut t = self.tables.write().map_err(poisoned)?;
        check_product_refs(&t, row.order_id, row.description_id)?;
        t.products.insert(row.id, row);
        Ok(())
    }

    pub fn insert_sale(&self, row: SalesAccounting) -> Result<(), AppError> {
        let mut t = self.tables.write().map_err(poisoned)?;
        if !t.products.contains_key(&row.product_id) {
            return Err(AppError::InvalidReference {
                field: "product_id",
                id: row.product_id,
            });
        }
        if !t.buyers.contains_key(&row.buyer_id) {
            return Err(AppError::InvalidReference {
                field: "buyer_id",
                id: row.buyer_id,
            });
        }
        t.sales.insert(row.id, row);
        Ok(())
    }
}

fn check_product_refs(t: &Tables, order_id: Option<i32>, description_id: i32) -> Result<(), AppError> {
    if let Some(order_id) = order_id {
        if !t.orders.contains_key(&order_id) {
            return Err(AppError::InvalidReference {
                field: "order_id",
                id: order_id,
            });
        }
    }
    if !t.descriptions.contains_key(&description_id) {
        return Err(AppError::InvalidReference {
            field: "description_id",
            id: description_id,
        });
    }
    Ok(())
}

#[async_trait]
impl StorekeeperStore for MemoryStore {
    async fn products_info(&self) -> Result<Vec<ProductInfo>, AppError> {
        let t = self.tables.read().map_err(poisoned)?;
        Ok(t.products
            .values()
            .filter_map(|p| {
                let d = t.descriptions.get(&p.description_id)?;
                Some(ProductInfo {
                    price: p.price,
                    count: p.count,
                    dimensions: d.dimensions.clone(),
                    weight: d.weight,
                    furniture_type: d.furniture_type.clone(),
                    material: d.material.clone(),
                })
            })
            .collect())
    }

    async fn sales_info(&self) -> Result<Vec<SaleInfo>, AppError> {
        let t = self.tables.read().map_err(poisoned)?;
        let mut rows = Vec::new();
        for p in t.products.values() {
            for s in t.sales.values().filter(|s| s.product_id == p.id) {
                rows.push(SaleInfo {
                    price: p.price,
                    count: p.count,
                    order_id: p.order_id,
                    date: s.date,
                });
            }
        }
        Ok(rows)
    }

    async fn buyers_info(&self) -> Result<Vec<BuyerInfo>, AppError> {
        let t = self.tables.read().map_err(poisoned)?;
        let mut rows = Vec::new();
        for b in t.buyers.values() {
            for s in t.sales.values().filter(|s| s.buyer_id == b.id) {
                rows.push(BuyerInfo {
                    full_name: b.full_name.clone(),
                    organization_name: b.organization_name.clone(),
                    phone_number: b.phone_number.clone(),
                    address: b.address.clone(),
                    date: s.date,
                    product_id: s.product_id,
                });
            }
        }
        Ok(rows)
    }

    async fn orders_info(&self) -> Result<Vec<OrderInfo>, AppError> {
        let t = self.tables.read().map_err(poisoned)?;
        let mut rows = Vec::new();
        for o in t.orders.values() {
            let Some(v) = t.providers.get(&o.provider_id) else {
                continue;
            };
            for p in t.products.values().filter(|p| p.order_id == Some(o.id)) {
                rows.push(OrderInfo {
                    product_quantity: o.product_quantity,
                    total_cost: o.total_cost,
                    price: p.price,
                    count: p.count,
                    product_name: v.product_name.clone(),
                    email: v.email.clone(),
                    phone_number: v.phone_number.clone(),
                    full_name: v.full_name.clone(),
                });
            }
        }
        Ok(rows)
    }

    async fn update_product(&self, data: &ProductData) -> Result<Product, AppError> {
        let mut t = self.tables.write().map_err(poisoned)?;
        let mut product = t
            .products
            .get(&data.id)
            .cloned()
            .ok_or(AppError::ProductNotFound(data.id))?;
        data.apply(&mut product);
        check_product_refs(&t, product.order_id, product.description_id)?;
        t.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.tables.read().map_err(poisoned).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldUpdate;
    use chrono::NaiveDate;

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_description(Description {
                id: 1,
                dimensions: "200x90x75".into(),
                weight: 35.5,
                furniture_type: "table".into(),
                material: "oak".into(),
            })
            .unwrap();
        store
            .insert_provider(Provider {
                id: 1,
                product_name: "tables".into(),
                email: "sales@acme.test".into(),
                phone_number: "+100".into(),
                full_name: "Acme".into(),
            })
            .unwrap();
        store
            .insert_order(Order {
                id: 1,
                product_quantity: 3,
                total_cost: 900,
                provider_id: 1,
            })
            .unwrap();
        store
            .insert_product(Product {
                id: 1,
                price: 300,
                count: 3,
                order_id: Some(1),
                description_id: 1,
            })
            .unwrap();
        store
            .insert_buyer(Buyer {
                id: 1,
                full_name: "Ivan Petrov".into(),
                organization_name: "Petrov LLC".into(),
                phone_number: "+200".into(),
                address: "Lenina 1".into(),
            })
            .unwrap();
        store
            .insert_sale(SalesAccounting {
                id: 1,
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                product_id: 1,
                buyer_id: 1,
            })
            .unwrap();
        store
    }

    #[tokio::test]
    async fn sale_for_missing_product_is_rejected() {
        let store = seeded();
        let err = store
            .insert_sale(SalesAccounting {
                id: 2,
                date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
                product_id: 99,
                buyer_id: 1,
            })
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidReference { field: "product_id", id: 99 }));
        assert_eq!(store.sales_info().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_with_dangling_description_writes_nothing() {
        let store = seeded();
        let before = store.products().unwrap();
        let data = ProductData {
            price: FieldUpdate::Set(1),
            description_id: FieldUpdate::Set(77),
            ..ProductData::new(1)
        };
        let err = store.update_product(&data).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidReference {
                field: "description_id",
                id: 77
            }
        ));
        assert_eq!(store.products().unwrap(), before);
    }

    #[tokio::test]
    async fn product_without_order_is_absent_from_orders_info() {
        let store = seeded();
        store
            .insert_product(Product {
                id: 2,
                price: 50,
                count: 10,
                order_id: None,
                description_id: 1,
            })
            .unwrap();
        assert_eq!(store.orders_info().await.unwrap().len(), 1);
        assert_eq!(store.products_info().await.unwrap().len(), 2);
    }
}
