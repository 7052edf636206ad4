//! Integration tests for `NemcClient` using wiremock HTTP mocks.

use sosmap_nemc::{NemcClient, NemcError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> NemcClient {
    NemcClient::with_base_url("test-key", 30, base_url)
        .expect("client construction should not fail")
}

fn envelope(items: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <response><header>\
         <resultCode>00</resultCode><resultMsg>NORMAL SERVICE.</resultMsg>\
         </header><body><items>{items}</items>\
         <numOfRows>3000</numOfRows><pageNo>1</pageNo><totalCount>1</totalCount>\
         </body></response>"
    )
}

#[tokio::test]
async fn pharmacy_list_parses_items_and_sends_key() {
    let server = MockServer::start().await;

    let body = envelope(
        "<item>\
         <hpid>C1100001</hpid>\
         <dutyName>Central Pharmacy</dutyName>\
         <dutyAddr>1 Sejong-daero</dutyAddr>\
         <dutyTel1>02-120</dutyTel1>\
         <wgs84Lat>37.5665</wgs84Lat>\
         <wgs84Lon>126.9780</wgs84Lon>\
         <dutyTime1s>0900</dutyTime1s>\
         <dutyTime1c>1800</dutyTime1c>\
         </item>",
    );

    Mock::given(method("GET"))
        .and(path(
            "/B552657/ErmctInsttInfoInqireService/getParmacyListInfoInqire",
        ))
        .and(query_param("serviceKey", "test-key"))
        .and(query_param("numOfRows", "3000"))
        .and(query_param("pageNo", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let items = client.pharmacy_list(None).await.expect("should parse");

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].hpid.as_deref(), Some("C1100001"));
    assert_eq!(items[0].duty_name.as_deref(), Some("Central Pharmacy"));
    assert_eq!(items[0].wgs84_lat, Some(37.5665));
    assert_eq!(items[0].duty_times[0].0.as_deref(), Some("0900"));
}

#[tokio::test]
async fn hospital_list_sends_region_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/B552657/ErmctInfoInqireService/getEgytListInfoInqire"))
        .and(query_param("Q0", "Seoul"))
        .and(query_param("Q1", "Jongno-gu"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope("")))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let region = sosmap_core::Region {
        city: "Seoul".to_owned(),
        district: Some("Jongno-gu".to_owned()),
    };
    let items = client
        .hospital_list(Some(&region))
        .await
        .expect("should succeed");
    assert!(items.is_empty());
}

#[tokio::test]
async fn realtime_beds_parses_counts() {
    let server = MockServer::start().await;

    let body = envelope(
        "<item>\
         <hpid>A1100001</hpid>\
         <dutyName>City Hospital</dutyName>\
         <hvec>12</hvec>\
         <hv1>trauma team on call</hv1>\
         <hvidate>20250601233000</hvidate>\
         </item>",
    );

    Mock::given(method("GET"))
        .and(path(
            "/B552657/ErmctInfoInqireService/getEmrrmRltmUsefulSckbdInfoInqire",
        ))
        .and(query_param("STAGE1", "Seoul"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let region = sosmap_core::Region {
        city: "Seoul".to_owned(),
        district: None,
    };
    let items = client
        .realtime_beds(Some(&region))
        .await
        .expect("should parse");

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].hvec, Some(12));
    assert_eq!(items[0].hvidate.as_deref(), Some("20250601233000"));
}

#[tokio::test]
async fn animal_hospital_list_uses_smaller_page_size() {
    let server = MockServer::start().await;

    let body = envelope(
        "<item>\
         <bizplcNm>Happy Paws Clinic</bizplcNm>\
         <rdnWhlAddr>2 Teheran-ro</rdnWhlAddr>\
         <telno>02-111-1111</telno>\
         <lat>37.50</lat>\
         <lon>127.03</lon>\
         </item>",
    );

    Mock::given(method("GET"))
        .and(path("/1543061/animalHosptlInfoService/animalHosptlInfo"))
        .and(query_param("numOfRows", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let items = client.animal_hospital_list().await.expect("should parse");

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].bizplc_nm.as_deref(), Some("Happy Paws Clinic"));
    assert_eq!(items[0].lat, Some(37.50));
}

#[tokio::test]
async fn non_zero_result_code_is_an_api_error() {
    let server = MockServer::start().await;

    let body = "<response><header>\
                <resultCode>22</resultCode>\
                <resultMsg>LIMITED NUMBER OF SERVICE REQUESTS EXCEEDS</resultMsg>\
                </header><body/></response>";

    Mock::given(method("GET"))
        .and(path("/B552657/AEDInfoInqireService/getAedLcinfoInqire"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.aed_list(None).await.expect_err("must fail");

    match err {
        NemcError::Api { code, message } => {
            assert_eq!(code, "22");
            assert!(message.contains("LIMITED"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_xml_body_is_an_xml_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/B552657/AEDInfoInqireService/getAedLcinfoInqire"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<response><header></wrong>"),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.aed_list(None).await.expect_err("must fail");
    assert!(matches!(err, NemcError::Xml { .. }));
}
