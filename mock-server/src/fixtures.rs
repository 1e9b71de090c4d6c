//! Canned records served by the mock, shaped like the vendor's payloads.

use serde_json::{json, Value};

pub const UNIT_NORTH: &str = "4f8b1f3ec0a94d2fa0a1c3f5d7e9b201";
pub const UNIT_SOUTH: &str = "4f8b1f3ec0a94d2fa0a1c3f5d7e9b202";
pub const STAFF_COURIER: &str = "9d2c7a10b3e44f5e8c6a1b2d3e4f5a01";
pub const STAFF_COOK: &str = "9d2c7a10b3e44f5e8c6a1b2d3e4f5a02";
pub const BUSINESS_DODO_PIZZA: &str = "63d4829611ea45c8ae71394860a2481c";
pub const BUSINESS_DRINKIT: &str = "c0b18e725258427a8bffea4f73957b0e";

pub fn sales() -> Vec<Value> {
    (1..=5)
        .map(|n| {
            json!({
                "id": format!("sale-{n}"),
                "unitId": if n % 2 == 0 { UNIT_SOUTH } else { UNIT_NORTH },
                "soldAtLocal": format!("2024-05-0{n}T12:00:00"),
                "orderSource": "Website",
                "salesChannel": "Delivery",
                "products": [{"productName": "Пепперони", "quantity": n, "priceWithDiscount": 549.0 * n as f64}],
            })
        })
        .collect()
}

pub fn staff_shifts() -> Vec<Value> {
    vec![
        json!({"id": "shift-1", "staffId": STAFF_COURIER, "unitId": UNIT_NORTH, "staffTypeName": "Courier", "clockInAtLocal": "2022-01-01T11:00:00", "clockOutAtLocal": "2022-01-01T20:00:00", "deliveredOrdersCount": 14}),
        json!({"id": "shift-2", "staffId": STAFF_COOK, "unitId": UNIT_NORTH, "staffTypeName": "KitchenMember", "clockInAtLocal": "2022-01-01T09:00:00", "clockOutAtLocal": "2022-01-01T18:00:00", "deliveredOrdersCount": 0}),
    ]
}

pub fn members() -> Vec<Value> {
    vec![
        json!({"id": STAFF_COOK, "firstName": "Анна", "lastName": "Смирнова", "staffType": "KitchenMember", "status": "Active", "unitId": UNIT_NORTH, "hiredOn": "2021-03-01"}),
        json!({"id": STAFF_COURIER, "firstName": "Пётр", "lastName": "Кузнецов", "staffType": "Courier", "status": "Active", "unitId": UNIT_NORTH, "hiredOn": "2021-06-15"}),
        json!({"id": "9d2c7a10b3e44f5e8c6a1b2d3e4f5a03", "firstName": "Олег", "lastName": "Попов", "staffType": "Cashier", "status": "Dismissed", "unitId": UNIT_SOUTH, "hiredOn": "2022-02-10", "dismissedOn": "2023-01-20"}),
    ]
}

pub fn legal_entities() -> Vec<Value> {
    vec![
        json!({"id": "1a2b3c4d5e6f47a8b9c0d1e2f3a4b5c6", "name": "ООО \"Пицца Север\"", "inn": "1101234567", "typeId": "e1d2c3b4a5f647e8d9c0b1a2f3e4d5c6"}),
        json!({"id": "1a2b3c4d5e6f47a8b9c0d1e2f3a4b5c7", "name": "ИП Сидоров", "inn": "110987654321", "typeId": "e1d2c3b4a5f647e8d9c0b1a2f3e4d5c7"}),
    ]
}

pub fn unit_shifts() -> Vec<Value> {
    vec![
        json!({"id": "unit-shift-1", "unitId": UNIT_NORTH, "openedAtLocal": "2024-01-01T09:00:00", "closedAtLocal": "2024-01-01T23:00:00"}),
        json!({"id": "unit-shift-2", "unitId": UNIT_SOUTH, "openedAtLocal": "2024-01-01T10:00:00", "closedAtLocal": "2024-01-02T01:00:00"}),
    ]
}

/// Organization names and addresses arrive with stray whitespace, quotes
/// and duplicated legal forms, as they do in production.
pub fn stores() -> Vec<Value> {
    vec![
        json!({"id": UNIT_NORTH, "name": "Сыктывкар-1", "businessId": BUSINESS_DODO_PIZZA, "state": "Open", "organizationName": "  ООО «Пицца Север» ", "location": {"fullAddress": " Сыктывкар, ул. Ленина, 1  "}}),
        json!({"id": UNIT_SOUTH, "name": "Сыктывкар-2", "businessId": BUSINESS_DODO_PIZZA, "state": "TemporaryClosed", "organizationName": "ИП \"Сидоров\"", "location": {"fullAddress": "Сыктывкар, ул. Мира, 5"}}),
        json!({"id": "4f8b1f3ec0a94d2fa0a1c3f5d7e9b203", "name": "Ухта-1", "businessId": BUSINESS_DODO_PIZZA, "state": "Close", "organizationName": null, "location": {"fullAddress": null}}),
    ]
}

pub fn roles() -> Value {
    json!({"roles": [{"id": 4, "name": "StoreManager"}, {"id": 9, "name": "ShiftSupervisor"}]})
}

pub fn role_units() -> Value {
    json!({"units": [{"id": UNIT_NORTH, "name": "Сыктывкар-1"}, {"id": UNIT_SOUTH, "name": "Сыктывкар-2"}]})
}

pub fn businesses() -> Value {
    json!({"businesses": [
        {"businessId": BUSINESS_DODO_PIZZA, "name": "Dodo Pizza", "units": [UNIT_NORTH, UNIT_SOUTH]},
        {"businessId": BUSINESS_DRINKIT, "name": "Drinkit", "units": []}
    ]})
}

/// One `skip`/`take` window of `items` under `key`.
pub fn page(key: &str, items: &[Value], skip: usize, take: usize) -> Value {
    let window: Vec<Value> = items.iter().skip(skip).take(take).cloned().collect();
    let mut body = json!({ "isEndOfListReached": skip.saturating_add(take) >= items.len() });
    body[key] = Value::Array(window);
    body
}
