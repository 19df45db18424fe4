use serde::{Deserialize, Serialize};

use super::de;
use crate::{Error, StoredDocument};

/// A catalog entry from the tenant's product list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Store-assigned document id.
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "nome")]
    pub name: Option<String>,
    #[serde(default, alias = "preco", deserialize_with = "de::opt_text")]
    pub price: Option<String>,
    #[serde(default, alias = "descricao")]
    pub description: Option<String>,
    #[serde(default, alias = "imagem", alias = "imagemUrl")]
    pub image_url: Option<String>,
    /// CSS `object-position` value, e.g. `50% 30%`.
    #[serde(default, alias = "pontoFoco")]
    pub focus_point: Option<String>,
    /// Explicit display position; lower comes first.
    #[serde(default, alias = "ordem", deserialize_with = "de::opt_i64")]
    pub order: Option<i64>,
}

impl TryFrom<StoredDocument> for Product {
    type Error = Error;

    fn try_from(doc: StoredDocument) -> Result<Self, Self::Error> {
        let mut product: Product = serde_json::from_value(serde_json::Value::Object(doc.data))
            .map_err(|e| Error::Decode(format!("product {}: {e}", doc.id)))?;
        product.id = doc.id;
        Ok(product)
    }
}

/// Order products by their display position.
///
/// Products without a position go last. The sort is stable, so ties and
/// unpositioned products keep the order the store returned them in.
pub fn sort_products(products: &mut [Product]) {
    products.sort_by_key(|p| (p.order.is_none(), p.order));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, data: serde_json::Value) -> StoredDocument {
        StoredDocument { id: id.to_string(), data: data.as_object().cloned().unwrap_or_default() }
    }

    fn product(id: &str, order: Option<i64>) -> Product {
        Product { id: id.to_string(), order, ..Default::default() }
    }

    #[test]
    fn test_from_document_uses_store_id() {
        let product = Product::try_from(doc(
            "p1",
            json!({"id": "ignored", "nome": "Tela iPhone", "preco": 349.9, "pontoFoco": "50% 30%", "ordem": "2"}),
        ))
        .unwrap();

        assert_eq!(product.id, "p1");
        assert_eq!(product.name.as_deref(), Some("Tela iPhone"));
        assert_eq!(product.price.as_deref(), Some("349.9"));
        assert_eq!(product.focus_point.as_deref(), Some("50% 30%"));
        assert_eq!(product.order, Some(2));
    }

    #[test]
    fn test_from_document_reports_id_on_failure() {
        let err = Product::try_from(doc("broken", json!({"nome": ["not", "text"]}))).unwrap_err();
        assert!(matches!(err, Error::Decode(msg) if msg.contains("broken")));
    }

    #[test]
    fn test_sort_products_by_order() {
        let mut products = vec![product("c", Some(3)), product("a", Some(1)), product("b", Some(2))];
        sort_products(&mut products);
        let ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_sort_products_keeps_fetch_order_without_positions() {
        let mut products =
            vec![product("x", None), product("first", Some(0)), product("y", None), product("tie", Some(0))];
        sort_products(&mut products);
        let ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["first", "tie", "x", "y"]);
    }
}
